//! Per-job record persisted as JSON in the jobs directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Operation submitted, transcript not yet available.
    Running,
    /// Operation finished and the transcript is stored in the record.
    Done,
    /// Operation finished with an API error.
    Failed,
}

impl JobStatus {
    /// Short label for console output.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Running => "RUNNING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }
}

// ---------------------------------------------------------------------------
// JobRecord
// ---------------------------------------------------------------------------

/// Everything the tool remembers about one transcription job.
///
/// One record is one JSON file named `<job_name>.json` in the jobs directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job name, derived from the audio file stem.
    pub job_name: String,
    /// Server-assigned long-running operation name, used for polling.
    pub operation_name: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Absolute path of the source audio file.
    pub audio_file: PathBuf,
    /// `gs://` URI of the uploaded audio object.
    pub gcs_uri: String,
    /// Joined transcript; present once the job is `Done`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl JobRecord {
    /// Create a fresh `Running` record for a just-started job.
    pub fn started(
        job_name: String,
        operation_name: String,
        audio_file: PathBuf,
        gcs_uri: String,
    ) -> Self {
        Self {
            job_name,
            operation_name,
            status: JobStatus::Running,
            audio_file,
            gcs_uri,
            transcript: None,
        }
    }

    /// Store the finished transcript and mark the job `Done`.
    pub fn complete(&mut self, transcript: String) {
        self.transcript = Some(transcript);
        self.status = JobStatus::Done;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JobRecord {
        JobRecord::started(
            "mesa_1".into(),
            "operations/12345".into(),
            PathBuf::from("/audio/mesa_1.wav"),
            "gs://bucket/mesa_1.wav".into(),
        )
    }

    #[test]
    fn started_record_is_running_without_transcript() {
        let record = sample();
        assert_eq!(record.status, JobStatus::Running);
        assert!(record.transcript.is_none());
    }

    #[test]
    fn complete_stores_transcript_and_marks_done() {
        let mut record = sample();
        record.complete("hola mundo".into());
        assert_eq!(record.status, JobStatus::Done);
        assert_eq!(record.transcript.as_deref(), Some("hola mundo"));
    }

    #[test]
    fn round_trip_json() {
        let mut record = sample();
        record.complete("texto final".into());

        let json = serde_json::to_string_pretty(&record).unwrap();
        let loaded: JobRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.job_name, record.job_name);
        assert_eq!(loaded.operation_name, record.operation_name);
        assert_eq!(loaded.status, JobStatus::Done);
        assert_eq!(loaded.gcs_uri, record.gcs_uri);
        assert_eq!(loaded.transcript, record.transcript);
    }

    #[test]
    fn status_serialises_uppercase() {
        let json = serde_json::to_string(&JobStatus::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
    }
}
