//! Segmentation: raw document text → word-count-bounded chunks.
//!
//! Three steps, each a pure function:
//!
//! 1. [`split_paragraphs`] — split on blank lines, trim, drop empties.
//! 2. [`LengthStats::of`]  — mean word count and the "too long" threshold,
//!    20% above the mean. The threshold follows the document's own style
//!    instead of a global constant.
//! 3. [`rechunk`]          — paragraphs above the threshold are cut into
//!    consecutive windows of `floor(avg_words)` words; the rest pass through.
//!
//! The threshold comparison uses the unrounded mean; only the window size
//! is truncated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Percentage above the mean word count at which a paragraph is "too long".
pub const THRESHOLD_PERCENT: f64 = 20.0;

/// A whitespace run containing at least two newlines.
static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Word-count statistics over a paragraph sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LengthStats {
    pub total_words: usize,
    /// Mean words per paragraph; 0 when there are no paragraphs.
    pub avg_words: f64,
    /// Paragraphs with strictly more words than this are split.
    pub length_threshold: f64,
    /// Words per window when splitting: `floor(avg_words)`, at least 1.
    pub window: usize,
}

impl LengthStats {
    pub fn of(paragraphs: &[String]) -> Self {
        let total_words: usize = paragraphs.iter().map(|p| word_count(p)).sum();
        let avg_words = if paragraphs.is_empty() {
            0.0
        } else {
            total_words as f64 / paragraphs.len() as f64
        };
        let length_threshold = avg_words + (avg_words * THRESHOLD_PERCENT) / 100.0;
        // A zero-width window would never advance.
        let window = (avg_words.floor() as usize).max(1);

        Self {
            total_words,
            avg_words,
            length_threshold,
            window,
        }
    }

    /// Whether a paragraph with `words` words must be split.
    pub fn is_too_long(&self, words: usize) -> bool {
        words as f64 > self.length_threshold
    }
}

/// The Segmenter's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Paragraphs found before re-chunking.
    pub paragraph_count: usize,
    pub stats: LengthStats,
    /// Chunks in document order.
    pub chunks: Vec<String>,
}

impl Segmentation {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split text on blank lines into trimmed, non-empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    RE_PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-chunk paragraphs that exceed `stats.length_threshold`.
pub fn rechunk(paragraphs: &[String], stats: &LengthStats) -> Vec<String> {
    let mut chunks = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if stats.is_too_long(words.len()) {
            let before = chunks.len();
            chunks.extend(words.chunks(stats.window).map(|w| w.join(" ")));
            debug!(
                "Split {}-word paragraph into {} windows of ≤{} words",
                words.len(),
                chunks.len() - before,
                stats.window
            );
        } else {
            chunks.push(paragraph.clone());
        }
    }

    chunks
}

/// Run all three steps over a document's text.
pub fn segment(text: &str) -> Segmentation {
    let paragraphs = split_paragraphs(text);
    let stats = LengthStats::of(&paragraphs);
    info!("Average words per paragraph: {:.2}", stats.avg_words);
    info!("Length threshold: {:.2}", stats.length_threshold);

    let chunks = rechunk(&paragraphs, &stats);
    info!(
        "Segmented {} paragraphs into {} chunks",
        paragraphs.len(),
        chunks.len()
    );

    Segmentation {
        paragraph_count: paragraphs.len(),
        stats,
        chunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Short one.\n\nShort two.\n\nThis is a much longer paragraph with many many more words than the others combined here.";

    fn words(chunks: &[String]) -> Vec<usize> {
        chunks.iter().map(|c| word_count(c)).collect()
    }

    #[test]
    fn eighteen_word_paragraph_is_cut_into_sevens() {
        let text = "Short one.\n\nShort two.\n\nThis is a much longer paragraph with many many more words than the others combined here by far.";
        let seg = segment(text);
        assert_eq!(seg.paragraph_count, 3);
        assert_eq!(seg.stats.total_words, 22);
        assert!((seg.stats.avg_words - 22.0 / 3.0).abs() < 1e-9);
        assert!((seg.stats.length_threshold - 8.8).abs() < 1e-9);
        assert_eq!(seg.stats.window, 7);
        assert_eq!(words(&seg.chunks), vec![2, 2, 7, 7, 4]);
        assert_eq!(seg.chunks[0], "Short one.");
        assert_eq!(seg.chunks[1], "Short two.");
        assert_eq!(seg.chunks[2], "This is a much longer paragraph with");
        assert_eq!(seg.chunks[4], "combined here by far.");
    }

    #[test]
    fn sample_document_yields_five_chunks() {
        // The long paragraph has 16 words: avg 20/3, threshold 8, window 6.
        let seg = segment(SAMPLE);
        assert_eq!(seg.stats.total_words, 20);
        assert!((seg.stats.length_threshold - 8.0).abs() < 1e-9);
        assert_eq!(seg.stats.window, 6);
        assert_eq!(words(&seg.chunks), vec![2, 2, 6, 6, 4]);
        assert_eq!(seg.chunks[2], "This is a much longer paragraph");
        assert_eq!(seg.chunks[4], "the others combined here.");
    }

    #[test]
    fn split_handles_blank_lines_with_spaces_and_crlf() {
        let text = "  first para \n \t \n\n second\r\n\r\nthird\nstill third";
        assert_eq!(
            split_paragraphs(text),
            vec!["first para", "second", "third\nstill third"]
        );
    }

    #[test]
    fn single_newlines_do_not_break_paragraphs() {
        assert_eq!(split_paragraphs("a\nb\nc"), vec!["a\nb\nc"]);
    }

    #[test]
    fn whitespace_only_text_has_no_paragraphs() {
        let seg = segment("\n\n   \n\t\n");
        assert!(seg.is_empty());
        assert_eq!(seg.paragraph_count, 0);
        assert_eq!(seg.stats.avg_words, 0.0);
        assert_eq!(seg.stats.length_threshold, 0.0);
    }

    #[test]
    fn paragraph_at_threshold_is_not_split() {
        // 6 + 4 words → avg 5, threshold 6.0; the 6-word paragraph stays whole.
        let paragraphs = vec!["one two three four five six".to_string(), "a b c d".to_string()];
        let stats = LengthStats::of(&paragraphs);
        assert!((stats.length_threshold - 6.0).abs() < 1e-9);
        assert_eq!(rechunk(&paragraphs, &stats), paragraphs);
    }

    #[test]
    fn window_uses_truncated_average_but_threshold_does_not() {
        // 2 + 3 + 9 = 14 words → avg 4.67, threshold 5.6, window 4.
        let paragraphs: Vec<String> = ["a b", "c d e", "1 2 3 4 5 6 7 8 9"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let stats = LengthStats::of(&paragraphs);
        assert_eq!(stats.window, 4);
        assert!(stats.length_threshold > 5.0 && stats.length_threshold < 6.0);
        let chunks = rechunk(&paragraphs, &stats);
        assert_eq!(words(&chunks), vec![2, 3, 4, 4, 1]);
    }

    #[test]
    fn internal_whitespace_of_kept_paragraphs_is_preserved() {
        let text = "alpha  beta\ngamma\n\ndelta epsilon zeta";
        let seg = segment(text);
        assert_eq!(seg.chunks[0], "alpha  beta\ngamma");
    }

    #[test]
    fn split_chunks_reconstruct_original_words() {
        let long = (1..=53).map(|i| format!("w{i}")).collect::<Vec<_>>().join("  ");
        let text = format!("tiny\n\n{long}\n\nsmall para here");
        let seg = segment(&text);

        let rebuilt: Vec<String> = seg
            .chunks
            .iter()
            .flat_map(|c| c.split_whitespace().map(str::to_string))
            .collect();
        let original: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        assert_eq!(rebuilt, original);
        assert!(seg.chunks.len() >= seg.paragraph_count);
    }

    #[test]
    fn window_never_zero() {
        assert_eq!(LengthStats::of(&[]).window, 1);
    }

    #[test]
    fn segmentation_json_reads_back() {
        let seg = segment(SAMPLE);
        let json = serde_json::to_string(&seg).unwrap();
        let back: Segmentation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seg);
        assert_eq!(back.stats.window, 6);
    }
}
