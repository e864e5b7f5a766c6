//! Fragment source: ordered transcript fragments from a batch directory.
//!
//! A batch directory holds the per-part output of a chunked transcription
//! job: files named like `job_part_000.json`, each a JSON object with at
//! least a `transcript` field.  Ordering is lexicographic on the file name,
//! which the external splitter guarantees matches the spoken order through
//! zero-padded part numbers.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::PipelineError;

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// One ordered unit of raw transcript text.
///
/// `position` is the index within the sorted batch — unique and totally
/// ordered.  Fragments are read once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub position: usize,
    pub text: String,
}

/// A corrected fragment, derived 1:1 from a [`Fragment`] and keeping its
/// source position so the merge phase sees the original order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedFragment {
    pub position: usize,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Fragment file format
// ---------------------------------------------------------------------------

/// The slice of a per-part record this tool cares about.
#[derive(Debug, Deserialize)]
struct FragmentRecord {
    transcript: String,
}

// ---------------------------------------------------------------------------
// FragmentSource
// ---------------------------------------------------------------------------

/// Reads the ordered fragment sequence out of a batch directory.
pub struct FragmentSource {
    dir: PathBuf,
}

impl FragmentSource {
    /// Create a source over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load all fragments, sorted by file name.
    ///
    /// Files that are unreadable, not valid JSON, or missing the
    /// `transcript` field are logged and skipped — a single bad part must
    /// not sink the batch.  Zero usable fragments is
    /// [`PipelineError::SourceEmpty`].
    pub fn load(&self) -> Result<Vec<Fragment>, PipelineError> {
        let mut paths = self.part_files()?;
        paths.sort();

        let mut fragments = Vec::with_capacity(paths.len());
        for path in &paths {
            match Self::read_record(path) {
                Ok(record) => fragments.push(Fragment {
                    position: fragments.len(),
                    text: record.transcript,
                }),
                Err(reason) => {
                    log::warn!("skipping fragment file {}: {reason}", path.display());
                }
            }
        }

        if fragments.is_empty() {
            return Err(PipelineError::SourceEmpty {
                dir: self.dir.clone(),
            });
        }

        log::info!(
            "loaded {} fragments from {}",
            fragments.len(),
            self.dir.display()
        );
        Ok(fragments)
    }

    /// All `*_part_*.json` files in the batch directory, unsorted.
    fn part_files(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|source| PipelineError::SourceIo {
                dir: self.dir.clone(),
                source,
            })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PipelineError::SourceIo {
                dir: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if Self::is_part_file(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    fn is_part_file(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.contains("_part_") && name.ends_with(".json")
    }

    fn read_record(path: &Path) -> Result<FragmentRecord, String> {
        let data = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&data).map_err(|e| e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_part(dir: &Path, name: &str, transcript: &str) {
        let body = serde_json::json!({ "transcript": transcript });
        std::fs::write(dir.join(name), body.to_string()).unwrap();
    }

    #[test]
    fn loads_fragments_in_file_name_order() {
        let dir = tempdir().expect("temp dir");
        // Written out of order on purpose.
        write_part(dir.path(), "job_part_001.json", "part two");
        write_part(dir.path(), "job_part_000.json", "part one");
        write_part(dir.path(), "job_part_002.json", "part three");

        let fragments = FragmentSource::new(dir.path()).load().unwrap();

        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].text, "part one");
        assert_eq!(fragments[1].text, "part two");
        assert_eq!(fragments[2].text, "part three");
        let positions: Vec<usize> = fragments.iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn ignores_files_without_part_pattern() {
        let dir = tempdir().expect("temp dir");
        write_part(dir.path(), "job_part_000.json", "real fragment");
        write_part(dir.path(), "summary.json", "not a fragment");
        std::fs::write(dir.path().join("job_part_001.txt"), "wrong extension").unwrap();

        let fragments = FragmentSource::new(dir.path()).load().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "real fragment");
    }

    #[test]
    fn empty_dir_is_source_empty() {
        let dir = tempdir().expect("temp dir");
        let err = FragmentSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::SourceEmpty { .. }));
    }

    #[test]
    fn missing_dir_is_source_io() {
        let dir = tempdir().expect("temp dir");
        let err = FragmentSource::new(dir.path().join("nope")).load().unwrap_err();
        assert!(matches!(err, PipelineError::SourceIo { .. }));
    }

    #[test]
    fn malformed_part_is_skipped() {
        let dir = tempdir().expect("temp dir");
        write_part(dir.path(), "job_part_000.json", "good");
        std::fs::write(dir.path().join("job_part_001.json"), "{ broken").unwrap();
        std::fs::write(
            dir.path().join("job_part_002.json"),
            r#"{ "status": "no transcript field" }"#,
        )
        .unwrap();

        let fragments = FragmentSource::new(dir.path()).load().unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "good");
    }

    #[test]
    fn all_parts_malformed_is_source_empty() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("job_part_000.json"), "{ broken").unwrap();
        let err = FragmentSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::SourceEmpty { .. }));
    }
}
