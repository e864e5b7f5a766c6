//! cloud-scribe — long-running speech transcription jobs and Markdown
//! reconstruction of their transcripts.
//!
//! The crate has two halves:
//!
//! * **Job management** ([`speech`], [`jobs`]) — upload audio to GCS, start
//!   a long-running Speech-to-Text job, poll it, and keep one JSON record
//!   per job on disk.
//! * **Reconstruction pipeline** ([`pipeline`], [`llm`]) — merge an ordered
//!   batch of transcript fragments into one coherent Markdown document:
//!   each fragment is cleaned up independently, then a strictly sequential
//!   merger appends newly structured content using a bounded trailing
//!   window of the document as context.
//!
//! All external services sit behind async traits
//! ([`speech::SpeechBackend`], [`llm::TextTransform`]) so the interesting
//! logic runs in tests with deterministic fakes and no network access.

pub mod config;
pub mod jobs;
pub mod llm;
pub mod pipeline;
pub mod speech;
