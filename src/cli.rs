//! CLI command definitions, routing, and async handlers.
//!
//! Transcript data (stored transcripts, assembled documents on sink
//! failure) goes to stdout; everything else is logged.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use cloud_scribe::config::{AppConfig, AppPaths};
use cloud_scribe::jobs::{JobRecord, JobStatus, JobStore};
use cloud_scribe::llm::ApiTransform;
use cloud_scribe::pipeline::{
    default_output_path, write_document, FragmentSource, Pipeline, PipelineError,
};
use cloud_scribe::speech::{GoogleSpeechClient, SpeechBackend};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Manage Google Speech-to-Text jobs and post-process their transcripts
/// into structured Markdown.
#[derive(Parser)]
#[command(name = "cloud-scribe", version, about)]
pub struct Cli {
    /// Jobs directory override (defaults to the platform data dir).
    #[arg(long, global = true)]
    pub jobs_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Upload an audio file to GCS and start a transcription job.
    Start {
        /// Path to the audio file.
        audio_path: PathBuf,

        /// Overwrite an existing job record with the same name.
        #[arg(long)]
        force: bool,
    },

    /// Poll a transcription job and store its transcript when done.
    Check {
        /// Job name (audio file stem).
        job_name: String,
    },

    /// Print the stored transcript of a completed job.
    Get {
        /// Job name (audio file stem).
        job_name: String,
    },

    /// List all known jobs and their status.
    List,

    /// Reconstruct a structured Markdown document from a fragment batch.
    Process {
        /// Directory holding the `*_part_*.json` fragment files.
        batch_dir: PathBuf,

        /// Output file (defaults to `<batch>.md` next to the batch directory).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Trailing words of the document used as merge context.
        #[arg(long)]
        context_words: Option<usize>,
    },

    /// Concatenate the raw fragment transcripts without any LLM processing.
    Export {
        /// Directory holding the `*_part_*.json` fragment files.
        batch_dir: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Dispatch the parsed command.
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let jobs_dir = cli.jobs_dir.unwrap_or_else(|| AppPaths::new().jobs_dir);
    let store = JobStore::new(jobs_dir);

    match cli.command {
        Command::Start { audio_path, force } => start(&config, &store, &audio_path, force).await,
        Command::Check { job_name } => check(&config, &store, &job_name).await,
        Command::Get { job_name } => get(&store, &job_name),
        Command::List => list(&store),
        Command::Process {
            batch_dir,
            output,
            context_words,
        } => process(&config, &batch_dir, output, context_words).await,
        Command::Export { batch_dir } => export(&batch_dir),
    }
}

// ---------------------------------------------------------------------------
// Job commands
// ---------------------------------------------------------------------------

async fn start(config: &AppConfig, store: &JobStore, audio_path: &Path, force: bool) -> Result<()> {
    let audio_path = audio_path
        .canonicalize()
        .with_context(|| format!("audio file not found: {}", audio_path.display()))?;

    let job_name = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .context("audio path has no file name")?;
    let object_name = audio_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .context("audio path has no file name")?;

    if store.exists(&job_name) && !force {
        bail!(
            "job '{job_name}' already exists ({}); re-run with --force to overwrite",
            store.record_path(&job_name).display()
        );
    }

    let backend = GoogleSpeechClient::from_config(&config.gcp);

    let gcs_uri = backend.upload(&audio_path, &object_name).await?;
    let operation_name = backend.start_recognition(&gcs_uri).await?;

    let record = JobRecord::started(job_name.clone(), operation_name, audio_path, gcs_uri);
    let path = store.save(&record)?;

    log::info!("started job '{job_name}'");
    log::info!("job details saved to {}", path.display());
    log::info!("to check status, run: cloud-scribe check {job_name}");
    Ok(())
}

async fn check(config: &AppConfig, store: &JobStore, job_name: &str) -> Result<()> {
    let mut record = store.load(job_name)?;
    let backend = GoogleSpeechClient::from_config(&config.gcp);

    let operation = backend.poll(&record.operation_name).await?;

    if !operation.done {
        log::info!("job '{job_name}' is still RUNNING");
        return Ok(());
    }

    if let Some(error) = operation.error {
        record.status = JobStatus::Failed;
        store.save(&record)?;
        bail!(
            "job '{job_name}' failed: {} (code {})",
            error.message,
            error.code
        );
    }

    let response = operation
        .response
        .context("operation is done but carries no recognition response")?;
    let transcript = response.joined_transcript();

    record.complete(transcript.clone());
    store.save(&record)?;

    log::info!("job '{job_name}' is DONE");
    println!("{transcript}");
    Ok(())
}

fn get(store: &JobStore, job_name: &str) -> Result<()> {
    let record = store.load(job_name)?;

    match (record.status, record.transcript) {
        (JobStatus::Done, Some(transcript)) => {
            println!("{transcript}");
            Ok(())
        }
        (JobStatus::Running, _) => {
            log::info!("job '{job_name}' is still running");
            log::info!("run: cloud-scribe check {job_name}");
            Ok(())
        }
        _ => bail!("transcript not available for job '{job_name}'; try 'check' first"),
    }
}

fn list(store: &JobStore) -> Result<()> {
    let records = store.list()?;
    if records.is_empty() {
        log::info!("no jobs found");
        return Ok(());
    }
    for record in records {
        println!("{:<8} {}", record.status.label(), record.job_name);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Batch commands
// ---------------------------------------------------------------------------

async fn process(
    config: &AppConfig,
    batch_dir: &Path,
    output: Option<PathBuf>,
    context_words: Option<usize>,
) -> Result<()> {
    let fragments = FragmentSource::new(batch_dir).load()?;

    let mut pipeline_config = config.pipeline.clone();
    if let Some(words) = context_words {
        pipeline_config.context_words = words;
    }

    let transform = ApiTransform::from_config(&config.llm);
    let pipeline = Pipeline::new(&transform, pipeline_config);
    let outcome = pipeline.run(&fragments).await?;

    let output_path = output.unwrap_or_else(|| default_output_path(batch_dir));
    if let Err(err) = write_document(&output_path, &outcome.document) {
        if let PipelineError::SinkWrite { ref document, .. } = err {
            log::error!("{err}");
            log::error!("dumping the assembled document to stdout so it is not lost:");
            println!("{document}");
        }
        return Err(err.into());
    }

    log::info!("{}", outcome.summary());
    log::info!("final Markdown document saved to {}", output_path.display());
    Ok(())
}

fn export(batch_dir: &Path) -> Result<()> {
    let fragments = FragmentSource::new(batch_dir).load()?;

    let raw: String = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let name = batch_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    let output_path = batch_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{name}_raw.txt"));

    write_document(&output_path, &raw)?;

    log::info!(
        "exported {} raw fragments to {}",
        fragments.len(),
        output_path.display()
    );
    Ok(())
}
