//! Trailing-context extraction for the merge phase.
//!
//! The merge step never feeds the whole accumulated document back to the
//! LLM — only its last `k` words.  The window is recomputed from the full
//! document on every step; at expected document sizes (tens of kilobytes) a
//! linear rescan per step is not worth replacing with a cached rolling tail.

/// Return the last `k` whitespace-separated words of `text`, joined by
/// single spaces.
///
/// `k = 0` yields an empty string; a text of `k` words or fewer is returned
/// whole (whitespace normalised to single spaces).
///
/// ```rust
/// use cloud_scribe::pipeline::context::tail_words;
///
/// assert_eq!(tail_words("one two three four", 2), "three four");
/// assert_eq!(tail_words("short text", 100), "short text");
/// assert_eq!(tail_words("anything", 0), "");
/// ```
pub fn tail_words(text: &str, k: usize) -> String {
    if k == 0 {
        return String::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(k);
    words[start..].join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_k_is_empty() {
        assert_eq!(tail_words("some document text", 0), "");
    }

    #[test]
    fn empty_text_is_empty() {
        assert_eq!(tail_words("", 10), "");
    }

    #[test]
    fn short_text_returned_whole() {
        assert_eq!(tail_words("only three words", 100), "only three words");
    }

    #[test]
    fn exact_length_returned_whole() {
        assert_eq!(tail_words("a b c", 3), "a b c");
    }

    #[test]
    fn takes_suffix() {
        assert_eq!(tail_words("uno dos tres cuatro cinco", 2), "cuatro cinco");
    }

    #[test]
    fn normalises_interior_whitespace() {
        assert_eq!(tail_words("one\ntwo\t three   four", 3), "two three four");
    }

    #[test]
    fn heading_markers_count_as_words() {
        let doc = "## Título\nprimer párrafo del documento";
        assert_eq!(tail_words(doc, 3), "párrafo del documento");
        assert_eq!(tail_words(doc, 5), "Título primer párrafo del documento");
    }
}
