//! Error types for the pdf-topics library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfTopicsError`] — **Fatal**: the run cannot proceed at all
//!   (credential missing, unreadable PDF, output not writable). Returned as
//!   `Err(PdfTopicsError)` from the top-level `classify_*` functions.
//!
//! * [`ClassificationFailure`] — **Non-fatal**: one chunk could not be
//!   classified (service error, timeout, response outside the label set).
//!   Stored inside [`crate::output::ChunkResult`] and written to the table
//!   as the `Error` sentinel; the remaining chunks are still classified.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-topics library.
#[derive(Debug, Error)]
pub enum PdfTopicsError {
    /// A required credential or configuration value is missing or invalid.
    ///
    /// Raised before the PDF is opened so no work is wasted.
    #[error("Configuration error: {detail}")]
    Configuration { detail: String },

    /// The PDF could not be read.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Segmentation produced no paragraphs (blank or image-only PDF).
    ///
    /// Not a crash: callers should log a notice and exit cleanly.
    #[error("No paragraphs found in {input}")]
    EmptyInput { input: String },

    /// Could not create or write the output CSV file.
    #[error("Failed to write output file '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfTopicsError {
    /// `true` for outcomes that end the run early without being failures.
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, PdfTopicsError::EmptyInput { .. })
    }

    pub(crate) fn configuration(detail: impl Into<String>) -> Self {
        PdfTopicsError::Configuration {
            detail: detail.into(),
        }
    }
}

/// Reasons the Extractor could not produce document text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error while reading one page's text layer.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageText { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library in the working\n\
directory, or install it system-wide.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumUnavailable(String),
}

/// A non-fatal error for a single chunk.
///
/// `chunk` is the 1-indexed position of the chunk in the segmented sequence.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum ClassificationFailure {
    /// The classification service returned an error.
    #[error("Chunk {chunk}: classification request failed: {detail}")]
    Service { chunk: usize, detail: String },

    /// The request did not complete within the configured timeout.
    #[error("Chunk {chunk}: classification request timed out after {secs}s")]
    Timeout { chunk: usize, secs: u64 },

    /// The service answered with nothing but whitespace.
    #[error("Chunk {chunk}: classification response was empty")]
    EmptyResponse { chunk: usize },

    /// The response did not name one of the allowed topics.
    #[error("Chunk {chunk}: response {response:?} is not one of the allowed topics")]
    UnrecognisedLabel { chunk: usize, response: String },
}

impl ClassificationFailure {
    /// The chunk position this failure belongs to.
    pub fn chunk(&self) -> usize {
        match self {
            ClassificationFailure::Service { chunk, .. }
            | ClassificationFailure::Timeout { chunk, .. }
            | ClassificationFailure::EmptyResponse { chunk }
            | ClassificationFailure::UnrecognisedLabel { chunk, .. } => *chunk,
        }
    }

    /// Re-attribute the failure to a chunk position.
    ///
    /// Classifier implementations do not know where a text sits in the
    /// sequence, so they report `chunk: 0` and the pipeline fills it in.
    pub(crate) fn at_chunk(self, position: usize) -> Self {
        match self {
            ClassificationFailure::Service { detail, .. } => ClassificationFailure::Service {
                chunk: position,
                detail,
            },
            ClassificationFailure::Timeout { secs, .. } => ClassificationFailure::Timeout {
                chunk: position,
                secs,
            },
            ClassificationFailure::EmptyResponse { .. } => {
                ClassificationFailure::EmptyResponse { chunk: position }
            }
            ClassificationFailure::UnrecognisedLabel { response, .. } => {
                ClassificationFailure::UnrecognisedLabel {
                    chunk: position,
                    response,
                }
            }
        }
    }
}
