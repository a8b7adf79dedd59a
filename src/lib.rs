//! # pdf-topics
//!
//! Split a PDF into paragraph-sized chunks and label each chunk with one of
//! a fixed set of news topics using an LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate the local file (exists, readable, %PDF)
//!  ├─ 2. Extract   page text via pdfium (spawn_blocking), pages concatenated
//!  ├─ 3. Segment   blank-line paragraphs; long ones re-cut into windows
//!  ├─ 4. Classify  one request per chunk, strictly sequential
//!  └─ 5. Output    `text,topic` CSV + run statistics
//! ```
//!
//! Paragraphs longer than the average word count plus 20% are cut into
//! consecutive windows of `floor(average)` words. A chunk that cannot be
//! classified is recorded with the topic `Error`; the run carries on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_topics::{classify_pdf_to_csv, ClassificationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ClassificationConfig::default();
//!     let stats = classify_pdf_to_csv("news.pdf", "classified_news.csv", &config).await?;
//!     eprintln!("{}/{} chunks classified", stats.classified, stats.chunks);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a service
//!
//! Everything after extraction runs against the [`TopicClassifier`] trait,
//! so a deterministic stub can stand in for the LLM:
//!
//! ```rust
//! use async_trait::async_trait;
//! use pdf_topics::{classify_text, ClassificationConfig, ClassificationFailure, Topic, TopicClassifier};
//!
//! struct AlwaysSports;
//!
//! #[async_trait]
//! impl TopicClassifier for AlwaysSports {
//!     async fn classify(&self, _text: &str, _labels: &[Topic]) -> Result<String, ClassificationFailure> {
//!         Ok("Sports".into())
//!     }
//! }
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let output = rt
//!     .block_on(classify_text("Cup final.\n\nExtra time.", &AlwaysSports, &ClassificationConfig::default()))
//!     .unwrap();
//! assert_eq!(output.topics(), ["Sports", "Sports"]);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-topics` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-topics = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod topic;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use classify::{
    classify_chunks, classify_pdf, classify_pdf_sync, classify_pdf_to_csv, classify_pdf_with,
    classify_text, classify_text_to_csv, segment_pdf,
};
pub use config::{ClassificationConfig, ClassificationConfigBuilder, LabelPolicy, DEFAULT_MODEL};
pub use error::{ClassificationFailure, ExtractionError, PdfTopicsError};
pub use output::{ChunkResult, ClassificationOutput, RunStats};
pub use pipeline::llm::{LlmTopicClassifier, TopicClassifier};
pub use pipeline::segment::{segment, LengthStats, Segmentation};
pub use progress::{ClassificationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use topic::{Topic, ERROR_LABEL};
