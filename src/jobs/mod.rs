//! Local job-state persistence.
//!
//! One transcription job = one JSON record under the jobs directory
//! (`AppPaths::jobs_dir`).  [`JobStore`] handles the files, [`JobRecord`]
//! holds the fields.

pub mod record;
pub mod store;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use record::{JobRecord, JobStatus};
pub use store::JobStore;
