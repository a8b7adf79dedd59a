//! End-to-end entry points: PDF → chunks → topics → CSV.
//!
//! Every stage consumes the full output of the previous one. Chunks are
//! classified strictly one after another; a failed chunk is recorded and
//! the loop moves on.

use crate::config::ClassificationConfig;
use crate::error::PdfTopicsError;
use crate::output::{ChunkResult, ClassificationOutput, RunStats};
use crate::pipeline::llm::{LlmTopicClassifier, TopicClassifier};
use crate::pipeline::segment::{self, Segmentation};
use crate::pipeline::{extract, sink};
use crate::topic::Topic;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Classify every chunk of a PDF.
///
/// The provider is resolved before the PDF is opened, so a missing
/// credential fails with [`PdfTopicsError::Configuration`] before any work.
///
/// # Errors
/// - [`PdfTopicsError::Configuration`] — no usable provider/credential
/// - [`PdfTopicsError::Extraction`] — file missing, not a PDF, unreadable
/// - [`PdfTopicsError::EmptyInput`] — no paragraphs (check `is_clean_exit()`)
pub async fn classify_pdf(
    input: impl AsRef<Path>,
    config: &ClassificationConfig,
) -> Result<ClassificationOutput, PdfTopicsError> {
    let classifier = LlmTopicClassifier::from_config(config)?;
    classify_pdf_with(input, &classifier, config).await
}

/// Like [`classify_pdf`], with a caller-supplied classifier.
pub async fn classify_pdf_with(
    input: impl AsRef<Path>,
    classifier: &dyn TopicClassifier,
    config: &ClassificationConfig,
) -> Result<ClassificationOutput, PdfTopicsError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting classification: {}", input.display());

    let extract_start = Instant::now();
    let extracted = extract::extract_text(input, config.password.as_deref()).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    let mut output = classify_document(
        &extracted.text,
        &format!("'{}'", input.display()),
        classifier,
        config,
    )
    .await?;
    output.stats.extract_duration_ms = extract_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Segment and classify already-extracted document text.
pub async fn classify_text(
    text: &str,
    classifier: &dyn TopicClassifier,
    config: &ClassificationConfig,
) -> Result<ClassificationOutput, PdfTopicsError> {
    let start = Instant::now();
    let mut output = classify_document(text, "document text", classifier, config).await?;
    output.stats.total_duration_ms = start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Classify a PDF and write the table to `output_path`.
///
/// Nothing is written when the run fails or finds no paragraphs.
pub async fn classify_pdf_to_csv(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ClassificationConfig,
) -> Result<RunStats, PdfTopicsError> {
    let output = classify_pdf(input, config).await?;
    sink::write_csv(output_path.as_ref(), &output.chunks)?;
    Ok(output.stats)
}

/// Classify document text and write the table to `output_path`.
pub async fn classify_text_to_csv(
    text: &str,
    output_path: impl AsRef<Path>,
    classifier: &dyn TopicClassifier,
    config: &ClassificationConfig,
) -> Result<RunStats, PdfTopicsError> {
    let output = classify_text(text, classifier, config).await?;
    sink::write_csv(output_path.as_ref(), &output.chunks)?;
    Ok(output.stats)
}

/// Extract and segment a PDF without classifying it.
///
/// Needs no credential. An empty [`Segmentation`] is returned as-is.
pub async fn segment_pdf(
    input: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<Segmentation, PdfTopicsError> {
    let extracted = extract::extract_text(input.as_ref(), password).await?;
    Ok(segment::segment(&extracted.text))
}

/// Synchronous wrapper around [`classify_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn classify_pdf_sync(
    input: impl AsRef<Path>,
    config: &ClassificationConfig,
) -> Result<ClassificationOutput, PdfTopicsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfTopicsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(classify_pdf(input, config))
}

/// Classify a chunk sequence, one request at a time.
///
/// The result has exactly one entry per chunk, in the same order, whatever
/// the classifier does.
pub async fn classify_chunks(
    chunks: &[String],
    classifier: &dyn TopicClassifier,
    config: &ClassificationConfig,
) -> Vec<ChunkResult> {
    let total = chunks.len();
    let mut results = Vec::with_capacity(total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    for (idx, text) in chunks.iter().enumerate() {
        let chunk = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_chunk_start(chunk, total);
        }

        let start = Instant::now();
        let outcome = match classifier.classify(text, &Topic::ALL).await {
            Ok(raw) => config.label_policy.resolve(&raw, &Topic::ALL, chunk),
            Err(e) => Err(e.at_chunk(chunk)),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(label) => {
                debug!("Chunk {}/{}: {} ({}ms)", chunk, total, label, duration_ms);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_complete(chunk, total, label);
                }
            }
            Err(e) => {
                warn!("Error processing chunk: {}", e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_error(chunk, total, &e.to_string());
                }
            }
        }

        results.push(ChunkResult {
            chunk,
            text: text.clone(),
            outcome,
            duration_ms,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, results.iter().filter(|r| r.is_classified()).count());
    }

    results
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn classify_document(
    text: &str,
    input_name: &str,
    classifier: &dyn TopicClassifier,
    config: &ClassificationConfig,
) -> Result<ClassificationOutput, PdfTopicsError> {
    let segmentation = segment::segment(text);
    if segmentation.is_empty() {
        return Err(PdfTopicsError::EmptyInput {
            input: input_name.to_string(),
        });
    }

    let classify_start = Instant::now();
    let chunks = classify_chunks(&segmentation.chunks, classifier, config).await;

    let mut stats = RunStats::from_segmentation(segmentation.paragraph_count, &segmentation.stats);
    stats.chunks = chunks.len();
    stats.classified = chunks.iter().filter(|c| c.is_classified()).count();
    stats.failed = stats.chunks - stats.classified;
    stats.classify_duration_ms = classify_start.elapsed().as_millis() as u64;

    info!(
        "Classification complete: {}/{} chunks labelled, {} failed",
        stats.classified, stats.chunks, stats.failed
    );

    Ok(ClassificationOutput { chunks, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassificationFailure;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers "Sports" for odd calls and fails on even ones.
    struct Alternating {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TopicClassifier for Alternating {
        async fn classify(&self, _text: &str, _labels: &[Topic]) -> Result<String, ClassificationFailure> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n % 2 == 1 {
                Ok(" Sports\n".into())
            } else {
                Err(ClassificationFailure::Service {
                    chunk: 0,
                    detail: "HTTP 503".into(),
                })
            }
        }
    }

    #[tokio::test]
    async fn failures_are_local_to_their_chunk() {
        let classifier = Alternating {
            calls: AtomicUsize::new(0),
        };
        let chunks: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let results = classify_chunks(&chunks, &classifier, &ClassificationConfig::default()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().map(|r| r.topic()).collect::<Vec<_>>(), ["Sports", "Error", "Sports"]);
        assert_eq!(results[1].outcome.as_ref().unwrap_err().chunk(), 2);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 3, "one request per chunk, no retries");
    }

    #[tokio::test]
    async fn empty_text_is_empty_input() {
        let classifier = Alternating {
            calls: AtomicUsize::new(0),
        };
        let err = classify_text("   \n\n  ", &classifier, &ClassificationConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_clean_exit());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }
}
