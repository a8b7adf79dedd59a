//! Result types produced by a classification run.

use crate::error::ClassificationFailure;
use crate::pipeline::segment::LengthStats;
use crate::topic::ERROR_LABEL;
use serde::{Deserialize, Serialize};

/// One classified chunk: the chunk text and the outcome of its request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// 1-indexed position in the segmented sequence.
    pub chunk: usize,
    pub text: String,
    /// The label, or why the chunk has none.
    pub outcome: Result<String, ClassificationFailure>,
    pub duration_ms: u64,
}

impl ChunkResult {
    /// Value of the `topic` column: the label, or [`ERROR_LABEL`].
    pub fn topic(&self) -> &str {
        match &self.outcome {
            Ok(label) => label,
            Err(_) => ERROR_LABEL,
        }
    }

    pub fn is_classified(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Counters and timings for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub paragraphs: usize,
    pub chunks: usize,
    pub classified: usize,
    pub failed: usize,
    pub avg_words: f64,
    pub length_threshold: f64,
    pub window: usize,
    pub extract_duration_ms: u64,
    pub classify_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl RunStats {
    pub(crate) fn from_segmentation(paragraphs: usize, stats: &LengthStats) -> Self {
        Self {
            paragraphs,
            avg_words: stats.avg_words,
            length_threshold: stats.length_threshold,
            window: stats.window,
            ..Self::default()
        }
    }
}

/// Everything a run produced before it was written out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationOutput {
    /// One entry per chunk, in document order.
    pub chunks: Vec<ChunkResult>,
    pub stats: RunStats,
}

impl ClassificationOutput {
    /// Labels in chunk order, with failures rendered as `Error`.
    pub fn topics(&self) -> Vec<&str> {
        self.chunks.iter().map(ChunkResult::topic).collect()
    }
}
