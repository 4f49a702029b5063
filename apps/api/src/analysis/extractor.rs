//! Text Extractor — uploaded PDF bytes → one normalized string.
//!
//! Pages are read in order with `lopdf` and joined with newlines. If that pass
//! finds nothing, `pdf-extract` gets a whole-document attempt before giving up.
//! Scanned/image-only PDFs end up as `ExtractionError::NoText`; there is no OCR.

use bytes::Bytes;
use lopdf::Document;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("The uploaded file is empty")]
    Empty,

    #[error("The uploaded file is not a valid PDF: {0}")]
    InvalidPdf(String),

    #[error("The PDF contains no extractable text (scanned or image-only PDFs are not supported)")]
    NoText,
}

/// Collapses every whitespace run to a single space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts and normalizes the text of a PDF held in memory.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let document =
        Document::load_mem(bytes).map_err(|e| ExtractionError::InvalidPdf(e.to_string()))?;

    let text = normalize_whitespace(&extract_pages(&document));
    if !text.is_empty() {
        return Ok(text);
    }

    debug!("Page-wise extraction found no text, trying whole-document pass");
    let text = normalize_whitespace(&extract_whole_document(bytes));
    if text.is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}

/// Runs `extract_text` on the blocking pool.
pub async fn extract_resume_text(bytes: Bytes) -> Result<String, AppError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))??;
    info!("Extracted {} chars of resume text from {} byte upload", text.len(), size);
    Ok(text)
}

fn extract_pages(document: &Document) -> String {
    document
        .get_pages()
        .keys()
        .filter_map(|&page_number| match document.extract_text(&[page_number]) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("Skipping page {page_number}: {e}");
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_whole_document(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed font programs instead of returning an error
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("pdf-extract failed: {e}");
            String::new()
        }
        Err(_) => {
            warn!("pdf-extract panicked while reading the document");
            String::new()
        }
    }
}
