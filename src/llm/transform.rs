//! Core `TextTransform` trait and `LlmError`.
//!
//! `TextTransform` is the generation-service boundary the reconstruction
//! pipeline depends on.  The pipeline never talks HTTP itself — it only sees
//! this trait, which makes it fully testable with deterministic fakes.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur during a text-generation call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextTransform trait
// ---------------------------------------------------------------------------

/// Async trait for the three generation calls the pipeline makes.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. behind `&dyn TextTransform` or `Arc<dyn TextTransform>`).
///
/// All three calls are stateless: every piece of context the model needs is
/// passed in explicitly.
#[async_trait]
pub trait TextTransform: Send + Sync {
    /// Clean up grammar, spelling and punctuation of one raw transcript
    /// fragment, preserving its meaning and content.
    async fn correct(&self, raw: &str) -> Result<String, LlmError>;

    /// Turn the first corrected fragment into the initial Markdown document
    /// body: one inferred section title plus organised content.
    async fn seed(&self, text: &str) -> Result<String, LlmError>;

    /// Produce the Markdown addition for `text`, given the trailing words of
    /// the document built so far.  The returned content must not repeat
    /// `context`; it opens a new titled section only on a topic change.
    async fn extend(&self, context: &str, text: &str) -> Result<String, LlmError>;
}
