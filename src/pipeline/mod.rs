//! Document-reconstruction pipeline.
//!
//! Turns an ordered batch of raw transcript fragments into one structured
//! Markdown document in two phases:
//!
//! ```text
//! batch dir ─▶ FragmentSource ─▶ correct_fragments ─▶ DocumentMerger ─▶ sink
//!              (ordered read)    (independent,         (strictly
//!                                 per-fragment)         sequential)
//! ```
//!
//! Per-fragment failures are absorbed locally (logged and skipped under the
//! default policy); only whole-pipeline conditions — nothing to process, or
//! the final write failing — surface to the caller.

pub mod context;
pub mod corrector;
pub mod merger;
pub mod source;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::llm::{LlmError, TextTransform};

pub use context::tail_words;
pub use corrector::{correct_fragments, CorrectionOutcome};
pub use merger::{DocumentMerger, MergeOutcome};
pub use source::{CorrectedFragment, Fragment, FragmentSource};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Whole-pipeline failure conditions.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No usable fragment files in the batch directory — fatal, no output
    /// is written.
    #[error("no '*_part_*.json' fragment files found in {}", dir.display())]
    SourceEmpty { dir: PathBuf },

    /// The batch directory itself could not be read.
    #[error("cannot read batch directory {}: {source}", dir.display())]
    SourceIo {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// Fragments were read but none survived correction.
    #[error("nothing to process: {total} fragments read, none survived correction")]
    NothingToProcess { total: usize },

    /// Correction failed under [`FailurePolicy::Abort`](crate::config::FailurePolicy).
    #[error("correction failed for fragment {position}: {source}")]
    CorrectionFailed { position: usize, source: LlmError },

    /// Writing the final document failed.  The assembled document rides
    /// along so the caller can recover it instead of losing the run.
    #[error("failed to write document to {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        document: String,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// PipelineOutcome
// ---------------------------------------------------------------------------

/// Summary of a completed run, for user-facing reporting.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The assembled Markdown document.
    pub document: String,
    /// Fragments read from the batch directory.
    pub total: usize,
    /// Fragments that survived the correction phase.
    pub corrected: usize,
    /// Fragments whose content made it into the document.
    pub merged: usize,
}

impl PipelineOutcome {
    /// `true` when every fragment made it all the way into the document.
    pub fn is_complete(&self) -> bool {
        self.merged == self.total
    }

    /// One-line human summary: full vs. partial success.
    pub fn summary(&self) -> String {
        if self.is_complete() {
            format!("all {} fragments processed", self.total)
        } else {
            format!(
                "partial success: {} of {} fragments corrected, {} merged",
                self.corrected, self.total, self.merged
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs the two-phase reconstruction over a fragment sequence.
pub struct Pipeline<'a> {
    transform: &'a dyn TextTransform,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(transform: &'a dyn TextTransform, config: PipelineConfig) -> Self {
        Self { transform, config }
    }

    /// Correct then merge the given fragments.
    ///
    /// Exactly one document per invocation: the first surviving fragment
    /// seeds it, every later one is merged in order.
    pub async fn run(&self, fragments: &[Fragment]) -> Result<PipelineOutcome, PipelineError> {
        let correction =
            correct_fragments(self.transform, fragments, self.config.failure_policy).await?;

        if correction.fragments.is_empty() {
            return Err(PipelineError::NothingToProcess {
                total: correction.total,
            });
        }

        if !correction.is_complete() {
            log::warn!(
                "{} of {} fragments dropped during correction",
                correction.skipped.len(),
                correction.total
            );
        }

        let merge = DocumentMerger::new(self.transform, self.config.context_words)
            .merge(&correction.fragments)
            .await?;

        Ok(PipelineOutcome {
            document: merge.document,
            total: correction.total,
            corrected: correction.fragments.len(),
            merged: merge.merged,
        })
    }
}

// ---------------------------------------------------------------------------
// Document sink
// ---------------------------------------------------------------------------

/// Default output destination for a batch: `<batch>.md` in the parent of
/// the batch directory (`jobs/test_job/` → `jobs/test_job.md`).
pub fn default_output_path(batch_dir: &Path) -> PathBuf {
    let name = batch_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    batch_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{name}.md"))
}

/// Write the final document to `path`.
///
/// On failure the in-memory document is returned inside the error so the
/// caller can surface it instead of silently losing the run.
pub fn write_document(path: &Path, document: &str) -> Result<(), PipelineError> {
    std::fs::write(path, document).map_err(|source| PipelineError::SinkWrite {
        path: path.to_path_buf(),
        document: document.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use async_trait::async_trait;
    use tempfile::tempdir;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Identity corrector + deterministic structurer, optionally failing
    /// corrections on a marker substring.
    struct ScriptedTransform {
        fail_correction_on: Option<String>,
    }

    #[async_trait]
    impl TextTransform for ScriptedTransform {
        async fn correct(&self, raw: &str) -> Result<String, LlmError> {
            if let Some(marker) = &self.fail_correction_on {
                if raw.contains(marker.as_str()) {
                    return Err(LlmError::Request("connection refused".into()));
                }
            }
            Ok(raw.to_string())
        }

        async fn seed(&self, text: &str) -> Result<String, LlmError> {
            Ok(format!("## Initial\n{text}"))
        }

        async fn extend(&self, _context: &str, text: &str) -> Result<String, LlmError> {
            Ok(format!("## New Section\n{text}"))
        }
    }

    fn fragments(texts: &[&str]) -> Vec<Fragment> {
        texts
            .iter()
            .enumerate()
            .map(|(position, text)| Fragment {
                position,
                text: text.to_string(),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // End-to-end pipeline
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn reference_scenario() {
        let transform = ScriptedTransform {
            fail_correction_on: None,
        };
        let pipeline = Pipeline::new(&transform, PipelineConfig::default());

        let outcome = pipeline
            .run(&fragments(&["this is part one.", "this is part two."]))
            .await
            .unwrap();

        assert_eq!(
            outcome.document,
            "## Initial\nthis is part one.\n\n## New Section\nthis is part two."
        );
        assert!(outcome.is_complete());
        assert_eq!(outcome.summary(), "all 2 fragments processed");
    }

    #[tokio::test]
    async fn skip_on_failure_merges_remaining_fragments() {
        let transform = ScriptedTransform {
            fail_correction_on: Some("two".into()),
        };
        let pipeline = Pipeline::new(&transform, PipelineConfig::default());

        let outcome = pipeline
            .run(&fragments(&["part one.", "part two.", "part three."]))
            .await
            .unwrap();

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.corrected, 2);
        assert_eq!(outcome.merged, 2);
        assert!(!outcome.is_complete());
        assert!(outcome.summary().contains("partial success"));
        assert!(outcome.summary().contains("2 of 3"));
        assert!(!outcome.document.contains("part two."));
    }

    #[tokio::test]
    async fn all_corrections_failed_is_nothing_to_process() {
        let transform = ScriptedTransform {
            fail_correction_on: Some("part".into()),
        };
        let pipeline = Pipeline::new(&transform, PipelineConfig::default());

        let err = pipeline
            .run(&fragments(&["part one.", "part two."]))
            .await
            .unwrap_err();

        match err {
            PipelineError::NothingToProcess { total } => assert_eq!(total, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn abort_policy_propagates_correction_failure() {
        let transform = ScriptedTransform {
            fail_correction_on: Some("two".into()),
        };
        let config = PipelineConfig {
            failure_policy: FailurePolicy::Abort,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(&transform, config);

        let err = pipeline
            .run(&fragments(&["part one.", "part two."]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::CorrectionFailed { position: 1, .. }));
    }

    // -----------------------------------------------------------------------
    // Sink
    // -----------------------------------------------------------------------

    #[test]
    fn default_output_is_sibling_md_of_batch_dir() {
        let path = default_output_path(Path::new("/data/jobs/test_job"));
        assert_eq!(path, Path::new("/data/jobs/test_job.md"));
    }

    #[test]
    fn write_document_round_trips() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("out.md");
        write_document(&path, "## Doc\ncontent").expect("write");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "## Doc\ncontent");
    }

    #[test]
    fn write_failure_carries_the_document() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing-subdir").join("out.md");
        let err = write_document(&path, "precious content").unwrap_err();
        match err {
            PipelineError::SinkWrite { document, .. } => {
                assert_eq!(document, "precious content");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
