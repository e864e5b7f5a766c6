//! Sequential structurer/merger — builds the final document.
//!
//! The merger is a two-state machine:
//!
//! ```text
//! Seed ──first fragment consumed──▶ Accumulating ──┐
//!                                        ▲         │ next fragment
//!                                        └─────────┘
//! ```
//!
//! * **Seed**: the first corrected fragment becomes the initial document
//!   body via [`TextTransform::seed`].  The transition happens
//!   unconditionally once the fragment is consumed, even when the call
//!   fails.
//! * **Accumulating**: every later fragment is structured against the
//!   trailing words of the document via [`TextTransform::extend`] and the
//!   returned addition is appended after a blank line.
//!
//! The document is append-only: once a span of text is in, no later step
//! edits or removes it.  A failed or empty step contributes nothing and the
//! next fragment sees the unmodified document as context.  This phase is
//! inherently sequential — each step's context depends on all prior output —
//! and must not be parallelised.

use crate::llm::TextTransform;

use super::context::tail_words;
use super::source::CorrectedFragment;
use super::PipelineError;

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// Result of the merge phase.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The assembled Markdown document.
    pub document: String,
    /// Number of fragments whose content made it into the document.
    pub merged: usize,
    /// Positions of fragments whose structuring step was skipped.
    pub skipped: Vec<usize>,
}

// ---------------------------------------------------------------------------
// MergeState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum MergeState {
    /// Waiting for the first fragment to seed the document.
    Seed,
    /// Document seeded; later fragments are appended incrementally.
    Accumulating,
}

// ---------------------------------------------------------------------------
// DocumentMerger
// ---------------------------------------------------------------------------

/// Merges an ordered sequence of corrected fragments into one document.
///
/// The merger owns the accumulating document string exclusively; nothing
/// else mutates it.  The merge policy (ordering, context-window
/// computation, append-only growth) is deterministic — only the text coming
/// back from the transform is not.
pub struct DocumentMerger<'a> {
    transform: &'a dyn TextTransform,
    context_words: usize,
    document: String,
    state: MergeState,
    merged: usize,
    skipped: Vec<usize>,
}

impl<'a> DocumentMerger<'a> {
    /// Create a merger that feeds the last `context_words` words of the
    /// document to every continuation call.
    pub fn new(transform: &'a dyn TextTransform, context_words: usize) -> Self {
        Self {
            transform,
            context_words,
            document: String::new(),
            state: MergeState::Seed,
            merged: 0,
            skipped: Vec::new(),
        }
    }

    /// Consume the whole fragment sequence and return the final document.
    ///
    /// An empty sequence is [`PipelineError::NothingToProcess`] — the
    /// pipeline never emits a document no fragment contributed to.
    pub async fn merge(
        mut self,
        fragments: &[CorrectedFragment],
    ) -> Result<MergeOutcome, PipelineError> {
        if fragments.is_empty() {
            return Err(PipelineError::NothingToProcess { total: 0 });
        }

        for fragment in fragments {
            self.step(fragment).await;
        }

        if self.merged == 0 {
            log::warn!("no fragment produced any document content");
        }

        Ok(MergeOutcome {
            document: self.document,
            merged: self.merged,
            skipped: self.skipped,
        })
    }

    /// Process one fragment according to the current state.
    async fn step(&mut self, fragment: &CorrectedFragment) {
        if fragment.text.trim().is_empty() {
            log::warn!(
                "corrected fragment {} is empty; skipping merge step",
                fragment.position
            );
            self.skipped.push(fragment.position);
            self.advance();
            return;
        }

        let result = match self.state {
            MergeState::Seed => {
                log::info!("seeding document from fragment {}", fragment.position);
                self.transform.seed(&fragment.text).await
            }
            MergeState::Accumulating => {
                let context = tail_words(&self.document, self.context_words);
                log::info!(
                    "merging fragment {} ({} words of context)",
                    fragment.position,
                    context.split_whitespace().count()
                );
                self.transform.extend(&context, &fragment.text).await
            }
        };

        match result {
            Ok(addition) if !addition.trim().is_empty() => {
                self.append(addition.trim());
                self.merged += 1;
            }
            Ok(_) => {
                log::warn!(
                    "structuring returned nothing for fragment {}; document unchanged",
                    fragment.position
                );
                self.skipped.push(fragment.position);
            }
            Err(e) => {
                log::warn!(
                    "structuring failed for fragment {} ({e}); document unchanged",
                    fragment.position
                );
                self.skipped.push(fragment.position);
            }
        }

        self.advance();
    }

    /// Append new content, separated from existing content by a blank line.
    fn append(&mut self, addition: &str) {
        if !self.document.is_empty() {
            self.document.push_str("\n\n");
        }
        self.document.push_str(addition);
    }

    /// Seed → Accumulating, unconditionally, after the first fragment.
    fn advance(&mut self) {
        self.state = MergeState::Accumulating;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Deterministic structurer: seed → `## Initial\n<text>`, extend →
    /// `## New Section\n<text>`.  Records every context it was handed and
    /// can fail on marked fragments.
    struct FakeStructurer {
        contexts: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl FakeStructurer {
        fn new() -> Self {
            Self {
                contexts: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(marker: &str) -> Self {
            Self {
                contexts: Mutex::new(Vec::new()),
                fail_on: Some(marker.to_string()),
            }
        }

        fn check_failure(&self, text: &str) -> Result<(), LlmError> {
            if let Some(marker) = &self.fail_on {
                if text.contains(marker.as_str()) {
                    return Err(LlmError::EmptyResponse);
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TextTransform for FakeStructurer {
        async fn correct(&self, raw: &str) -> Result<String, LlmError> {
            Ok(raw.to_string())
        }

        async fn seed(&self, text: &str) -> Result<String, LlmError> {
            self.check_failure(text)?;
            Ok(format!("## Initial\n{text}"))
        }

        async fn extend(&self, context: &str, text: &str) -> Result<String, LlmError> {
            self.contexts.lock().unwrap().push(context.to_string());
            self.check_failure(text)?;
            Ok(format!("## New Section\n{text}"))
        }
    }

    fn corrected(texts: &[&str]) -> Vec<CorrectedFragment> {
        texts
            .iter()
            .enumerate()
            .map(|(position, text)| CorrectedFragment {
                position,
                text: text.to_string(),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn two_fragment_scenario_produces_expected_document() {
        let transform = FakeStructurer::new();
        let fragments = corrected(&["this is part one.", "this is part two."]);

        let outcome = DocumentMerger::new(&transform, 100)
            .merge(&fragments)
            .await
            .unwrap();

        assert_eq!(
            outcome.document,
            "## Initial\nthis is part one.\n\n## New Section\nthis is part two."
        );
        assert_eq!(outcome.merged, 2);
        assert!(outcome.skipped.is_empty());
    }

    #[tokio::test]
    async fn single_fragment_seeds_and_terminates() {
        let transform = FakeStructurer::new();
        let fragments = corrected(&["only fragment."]);

        let outcome = DocumentMerger::new(&transform, 100)
            .merge(&fragments)
            .await
            .unwrap();

        assert_eq!(outcome.document, "## Initial\nonly fragment.");
        assert_eq!(outcome.merged, 1);
        // No continuation call was made.
        assert!(transform.contexts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_sequence_is_nothing_to_process() {
        let transform = FakeStructurer::new();
        let err = DocumentMerger::new(&transform, 100)
            .merge(&[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NothingToProcess { .. }));
    }

    #[tokio::test]
    async fn contributions_appear_in_source_order() {
        let transform = FakeStructurer::new();
        let fragments = corrected(&["alpha", "beta", "gamma"]);

        let outcome = DocumentMerger::new(&transform, 100)
            .merge(&fragments)
            .await
            .unwrap();

        let a = outcome.document.find("alpha").unwrap();
        let b = outcome.document.find("beta").unwrap();
        let g = outcome.document.find("gamma").unwrap();
        assert!(a < b && b < g);
    }

    #[tokio::test]
    async fn document_grows_append_only() {
        let transform = FakeStructurer::new();
        let fragments = corrected(&["one", "two", "three"]);

        // Merge step by step to observe the intermediate documents.
        let mut merger = DocumentMerger::new(&transform, 100);
        let mut previous = String::new();
        for fragment in &fragments {
            merger.step(fragment).await;
            assert!(
                merger.document.starts_with(&previous),
                "step removed or edited earlier content"
            );
            previous = merger.document.clone();
        }
    }

    #[tokio::test]
    async fn context_window_is_bounded_tail() {
        let transform = FakeStructurer::new();
        let fragments = corrected(&["uno dos tres cuatro cinco seis", "next"]);

        DocumentMerger::new(&transform, 3)
            .merge(&fragments)
            .await
            .unwrap();

        let contexts = transform.contexts.lock().unwrap();
        assert_eq!(contexts.len(), 1);
        // Last 3 words of "## Initial\nuno dos tres cuatro cinco seis".
        assert_eq!(contexts[0], "cuatro cinco seis");
    }

    #[tokio::test]
    async fn failed_step_leaves_document_unchanged_and_continues() {
        let transform = FakeStructurer::failing_on("bad");
        let fragments = corrected(&["good start", "bad middle", "good end"]);

        let outcome = DocumentMerger::new(&transform, 100)
            .merge(&fragments)
            .await
            .unwrap();

        assert_eq!(
            outcome.document,
            "## Initial\ngood start\n\n## New Section\ngood end"
        );
        assert_eq!(outcome.merged, 2);
        assert_eq!(outcome.skipped, vec![1]);

        // The fragment after the failure saw the pre-failure document.
        let contexts = transform.contexts.lock().unwrap();
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[1], "## Initial good start");
    }

    #[tokio::test]
    async fn seed_failure_still_transitions_to_accumulating() {
        let transform = FakeStructurer::failing_on("first");
        let fragments = corrected(&["first fragment", "second fragment"]);

        let outcome = DocumentMerger::new(&transform, 100)
            .merge(&fragments)
            .await
            .unwrap();

        // The second fragment went through `extend` (with empty context),
        // not `seed` — the transition is unconditional.
        assert_eq!(outcome.document, "## New Section\nsecond fragment");
        assert_eq!(outcome.skipped, vec![0]);
        let contexts = transform.contexts.lock().unwrap();
        assert_eq!(contexts.as_slice(), ["".to_string()]);
    }

    #[tokio::test]
    async fn empty_corrected_fragment_skips_without_a_call() {
        let transform = FakeStructurer::new();
        let fragments = corrected(&["  ", "real content"]);

        let outcome = DocumentMerger::new(&transform, 100)
            .merge(&fragments)
            .await
            .unwrap();

        // The blank first fragment consumed the Seed state, so the real one
        // was merged as a continuation.
        assert_eq!(outcome.document, "## New Section\nreal content");
        assert_eq!(outcome.skipped, vec![0]);
    }
}
