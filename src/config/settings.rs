//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//!
//! Secrets are never written to `settings.toml`: the GCP access token and
//! the LLM API key are picked up from the environment once, in
//! [`AppConfig::load`], and carried in the config structs from then on —
//! nothing else in the crate reads the environment.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable holding the OAuth bearer token for Google APIs
/// (e.g. the output of `gcloud auth print-access-token`).
pub const ENV_GCP_ACCESS_TOKEN: &str = "GCP_ACCESS_TOKEN";
/// Environment variable overriding the GCS bucket name.
pub const ENV_GCS_BUCKET: &str = "GCS_BUCKET_NAME";
/// Environment variable holding the LLM API key.
pub const ENV_LLM_API_KEY: &str = "LLM_API_KEY";

// ---------------------------------------------------------------------------
// GcpConfig
// ---------------------------------------------------------------------------

/// Settings for the Google Cloud Speech-to-Text and Storage collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    /// GCS bucket that receives audio uploads.  `None` until configured —
    /// the `start` command refuses to run without it.
    pub bucket: Option<String>,
    /// BCP-47 language code of the recordings (e.g. `"es-419"`).
    pub language_code: String,
    /// Sample rate of the audio files in Hz.
    pub sample_rate_hertz: u32,
    /// Audio encoding name as the Speech API expects it (e.g. `"LINEAR16"`).
    pub encoding: String,
    /// Ask the API to insert periods, commas and question marks.
    pub enable_automatic_punctuation: bool,
    /// Maximum seconds to wait for any single HTTP call.
    pub timeout_secs: u64,
    /// OAuth bearer token — environment-only, never persisted.
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            language_code: "es-419".into(),
            sample_rate_hertz: 16_000,
            encoding: "LINEAR16".into(),
            enable_automatic_punctuation: true,
            timeout_secs: 30,
            access_token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the text-generation collaborator used by the `process`
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"qwen2.5:3b"`, `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for an LLM response before timing out.
    pub timeout_secs: u64,
    /// ISO-639-1 code of the transcript language; selects the prompt set.
    pub language: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.3,
            timeout_secs: 60,
            language: "es".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What to do when the LLM fails to correct a fragment.
///
/// | Variant | Behaviour                                               |
/// |---------|---------------------------------------------------------|
/// | Skip    | Log, drop the fragment, keep going (reference default)  |
/// | Abort   | Fail the whole run — no gappy documents                 |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Drop the failed fragment and continue with the rest.
    Skip,
    /// Abort the run on the first correction failure.
    Abort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::Skip
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Settings for the document-reconstruction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of trailing words of the accumulated document fed to the LLM
    /// as context when merging the next fragment.
    pub context_words: usize,
    /// Per-fragment correction failure policy.
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_words: 100,
            failure_policy: FailurePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use cloud_scribe::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Cloud settings (Speech-to-Text + GCS).
    pub gcp: GcpConfig,
    /// LLM post-processing settings.
    pub llm: LlmConfig,
    /// Reconstruction pipeline settings.
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml` and
    /// apply environment overrides (bucket, access token, API key).
    ///
    /// Returns `Ok` with defaults when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).  Does *not* touch the
    /// environment.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Pull secrets and overrides from the process environment.
    ///
    /// This is the only place in the crate that reads environment variables;
    /// everything downstream receives plain config structs.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var(ENV_GCS_BUCKET) {
            if !bucket.is_empty() {
                self.gcp.bucket = Some(bucket);
            }
        }
        if let Ok(token) = std::env::var(ENV_GCP_ACCESS_TOKEN) {
            if !token.is_empty() {
                self.gcp.access_token = Some(token);
            }
        }
        if let Ok(key) = std::env::var(ENV_LLM_API_KEY) {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
