//! Text extraction: read every page's text layer via pdfium.
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is not
//! safe to call from async contexts. Extraction therefore runs inside
//! `tokio::task::spawn_blocking`; the library bindings and the document
//! handle live only for the duration of that closure.
//!
//! Scanned, image-only PDFs have no text layer and yield an empty string,
//! which the Segmenter turns into "no paragraphs found".

use crate::error::{ExtractionError, PdfTopicsError};
use crate::pipeline::input::validate_pdf_path;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The text of a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    /// All page texts, concatenated in page order with no separator.
    pub text: String,
    pub page_count: usize,
}

/// Extract the text of the PDF at `path`.
pub async fn extract_text(
    path: &Path,
    password: Option<&str>,
) -> Result<ExtractedText, PdfTopicsError> {
    let path = validate_pdf_path(path)?;
    let pwd = password.map(|s| s.to_string());

    let extracted = tokio::task::spawn_blocking(move || extract_text_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| PdfTopicsError::Internal(format!("Extraction task panicked: {}", e)))??;

    info!(
        "Extracted {} characters from {} pages",
        extracted.text.len(),
        extracted.page_count
    );
    Ok(extracted)
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<ExtractedText, ExtractionError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path, password, format!("{:?}", e)))?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    debug!("PDF loaded: {} pages", page_count);

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page.text().map_err(|e| ExtractionError::PageText {
            page: idx + 1,
            detail: format!("{:?}", e),
        })?;
        let content = page_text.all();
        debug!("Page {}: {} characters", idx + 1, content.len());
        text.push_str(&content);
    }

    Ok(ExtractedText { text, page_count })
}

/// Bind to the pdfium shared library.
///
/// Search order: `PDFIUM_LIB_PATH`, the working directory, then the
/// system library path.
fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => Pdfium::bind_to_library(PathBuf::from(p)),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExtractionError::PdfiumUnavailable(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Map a pdfium load failure onto the most specific error.
fn classify_load_error(path: &Path, password: Option<&str>, detail: String) -> ExtractionError {
    let path = path.to_path_buf();
    if detail.to_lowercase().contains("password") {
        if password.is_some() {
            ExtractionError::WrongPassword { path }
        } else {
            ExtractionError::PasswordRequired { path }
        }
    } else {
        ExtractionError::CorruptPdf { path, detail }
    }
}
