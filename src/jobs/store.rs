//! Flat-file job store: one JSON record per job in a jobs directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::record::JobRecord;

// ---------------------------------------------------------------------------
// JobStore
// ---------------------------------------------------------------------------

/// Loads and saves [`JobRecord`]s under a single directory.
///
/// The directory is created lazily on the first save.
pub struct JobStore {
    dir: PathBuf,
}

impl JobStore {
    /// Create a store rooted at `dir` (usually `AppPaths::jobs_dir`).
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the record file for `job_name`.
    pub fn record_path(&self, job_name: &str) -> PathBuf {
        self.dir.join(format!("{job_name}.json"))
    }

    /// Returns `true` when a record for `job_name` exists.
    pub fn exists(&self, job_name: &str) -> bool {
        self.record_path(job_name).exists()
    }

    /// Load the record for `job_name`.
    pub fn load(&self, job_name: &str) -> Result<JobRecord> {
        let path = self.record_path(job_name);
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("job '{job_name}' not found (looked for {})", path.display()))?;
        let record = serde_json::from_str(&data)
            .with_context(|| format!("malformed job record {}", path.display()))?;
        Ok(record)
    }

    /// Save (create or overwrite) a record, creating the jobs directory as
    /// needed.
    pub fn save(&self, record: &JobRecord) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create jobs directory {}", self.dir.display()))?;
        let path = self.record_path(&record.job_name);
        let data = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, data)
            .with_context(|| format!("cannot write job record {}", path.display()))?;
        Ok(path)
    }

    /// All records in the store, sorted by job name.  Unreadable files are
    /// logged and skipped.
    pub fn list(&self) -> Result<Vec<JobRecord>> {
        let mut records = Vec::new();
        if !self.dir.exists() {
            return Ok(records);
        }
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("cannot read jobs directory {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::load_path(&path) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("skipping unreadable job record {}: {e}", path.display()),
            }
        }
        records.sort_by(|a, b| a.job_name.cmp(&b.job_name));
        Ok(records)
    }

    fn load_path(path: &Path) -> Result<JobRecord> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
