//! Google Cloud Speech-to-Text job collaborators.
//!
//! * [`SpeechBackend`] — async trait: upload audio, start recognition, poll.
//! * [`GoogleSpeechClient`] — REST implementation (GCS JSON upload API +
//!   Speech-to-Text v1).
//! * [`types`] — serde wire types for requests and operations.

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{GoogleSpeechClient, SpeechBackend, SpeechError};
pub use types::{LongRunningRecognizeResponse, Operation};
