//! Correction phase: independent per-fragment cleanup.
//!
//! Each fragment is corrected on its own — there is no dependency between
//! fragments, so the phase could in principle run with bounded concurrency;
//! this implementation keeps the reference behaviour and corrects them one
//! at a time, in order.

use crate::config::FailurePolicy;
use crate::llm::TextTransform;

use super::source::{CorrectedFragment, Fragment};
use super::PipelineError;

// ---------------------------------------------------------------------------
// CorrectionOutcome
// ---------------------------------------------------------------------------

/// Result of the correction phase.
#[derive(Debug)]
pub struct CorrectionOutcome {
    /// Surviving fragments, in original sequence order.
    pub fragments: Vec<CorrectedFragment>,
    /// Number of fragments read from the source.
    pub total: usize,
    /// Positions of fragments dropped (empty input or failed transform).
    pub skipped: Vec<usize>,
}

impl CorrectionOutcome {
    /// `true` when every source fragment survived correction.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Correction phase
// ---------------------------------------------------------------------------

/// Correct all fragments in order.
///
/// * Empty fragment text is a no-op: no call is made and the fragment is
///   dropped.
/// * A failed or empty transform result is handled per `policy`:
///   [`FailurePolicy::Skip`] logs and drops the fragment;
///   [`FailurePolicy::Abort`] fails the run with the fragment position.
///
/// Survivors keep their source positions, so the merge phase sees them in
/// the original total order.
pub async fn correct_fragments(
    transform: &dyn TextTransform,
    fragments: &[Fragment],
    policy: FailurePolicy,
) -> Result<CorrectionOutcome, PipelineError> {
    let mut corrected = Vec::with_capacity(fragments.len());
    let mut skipped = Vec::new();

    for fragment in fragments {
        if fragment.text.trim().is_empty() {
            log::warn!("fragment {} is empty; skipping", fragment.position);
            skipped.push(fragment.position);
            continue;
        }

        match transform.correct(&fragment.text).await {
            Ok(text) => {
                log::debug!(
                    "fragment {} corrected ({} -> {} chars)",
                    fragment.position,
                    fragment.text.len(),
                    text.len()
                );
                corrected.push(CorrectedFragment {
                    position: fragment.position,
                    text,
                });
            }
            Err(source) => match policy {
                FailurePolicy::Skip => {
                    log::warn!(
                        "correction failed for fragment {} ({source}); dropping it",
                        fragment.position
                    );
                    skipped.push(fragment.position);
                }
                FailurePolicy::Abort => {
                    return Err(PipelineError::CorrectionFailed {
                        position: fragment.position,
                        source,
                    });
                }
            },
        }
    }

    Ok(CorrectionOutcome {
        fragments: corrected,
        total: fragments.len(),
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
