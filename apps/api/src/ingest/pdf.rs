//! Text extraction from uploaded resume PDFs.
//!
//! `pdf-extract` is synchronous and CPU-bound, so extraction runs on the blocking pool.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Uploaded file is not a PDF")]
    NotPdf,

    #[error("Could not extract text from PDF")]
    NoText,

    #[error("PDF extraction failed: {0}")]
    Backend(String),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        AppError::Pdf(e.to_string())
    }
}

/// Extracts the text layer of a PDF, trimmed. Empty output is an error.
pub async fn extract_text(data: Bytes) -> Result<String, ExtractError> {
    if !data.starts_with(PDF_MAGIC) {
        return Err(ExtractError::NotPdf);
    }

    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            // The extractor panics on some malformed streams.
            warn!("PDF extraction task failed: {e}");
            ExtractError::Backend(e.to_string())
        })?
        .map_err(|e| ExtractError::Backend(e.to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::NoText);
    }

    debug!("Extracted {} chars from {} byte PDF", text.len(), size);
    Ok(text.to_string())
}
