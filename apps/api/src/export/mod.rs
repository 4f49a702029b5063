// Document Exporter: plain text → paginated PDF bytes.
// Rendering is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod pdf;
pub mod winansi;

use bytes::Bytes;
use thiserror::Error;

use crate::errors::AppError;

pub use font_metrics::default_page_config;
pub use pdf::render_pdf;

/// File name offered to the browser for exported resumes.
pub const EXPORT_FILE_NAME: &str = "resume.pdf";
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Character {character:?} on line {line} cannot be rendered in the PDF font")]
    UnsupportedCharacter { character: char, line: usize },

    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// Renders `text` on the blocking pool with the default page config.
pub async fn export_pdf(text: String) -> Result<Bytes, AppError> {
    let pdf = tokio::task::spawn_blocking(move || render_pdf(&text, &default_page_config()))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export task panicked: {e}")))??;
    Ok(Bytes::from(pdf))
}
