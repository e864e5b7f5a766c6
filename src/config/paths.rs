//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\cloud-scribe\
//!   macOS:   ~/Library/Application Support/cloud-scribe/
//!   Linux:   ~/.config/cloud-scribe/
//!
//! Data dir (job records):
//!   Windows: %LOCALAPPDATA%\cloud-scribe\
//!   macOS:   ~/Library/Application Support/cloud-scribe/
//!   Linux:   ~/.local/share/cloud-scribe/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for per-job JSON records.
    pub jobs_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "cloud-scribe";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let jobs_dir = data_dir.join("jobs");

        Self {
            config_dir,
            settings_file,
            jobs_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
