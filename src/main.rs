//! Application entry point — cloud-scribe.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line.
//! 3. Load [`AppConfig`] from disk (defaults on first run) and apply
//!    environment overrides.
//! 4. Create the tokio runtime (multi-thread, 2 workers).
//! 5. Dispatch to the matching command handler; non-zero exit on error.

mod cli;

use clap::Parser;

use cloud_scribe::config::AppConfig;

fn main() {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Command line
    let args = cli::Cli::parse();

    // 3. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config
    });

    // 4. Tokio runtime (2 workers — one HTTP call in flight plus logging is
    //    all this tool ever needs)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 5. Dispatch
    if let Err(e) = rt.block_on(cli::run(args, config)) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
