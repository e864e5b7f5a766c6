//! Text-generation collaborators for the reconstruction pipeline.
//!
//! This module provides:
//! * [`TextTransform`] — async trait with the three generation calls the
//!   pipeline makes: `correct`, `seed`, `extend`.
//! * [`ApiTransform`] — OpenAI-compatible REST implementation.
//! * [`PromptBuilder`] — builds Spanish/English prompts for all three calls.
//! * [`LlmError`] — error variants for generation calls.
//!
//! The pipeline only ever sees `&dyn TextTransform`, so it can be exercised
//! in tests with deterministic fakes and no network access.

pub mod api;
pub mod prompt;
pub mod transform;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::ApiTransform;
pub use prompt::PromptBuilder;
pub use transform::{LlmError, TextTransform};
