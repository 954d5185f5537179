//! Resume text extraction. PDF via `pdf-extract`, DOCX by reading the document XML part.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub mod docx;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Result<Self, DocumentError> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(DocumentError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Format of an uploaded file, judged by its name.
    pub fn from_filename(filename: &str) -> Result<Self, DocumentError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| DocumentError::UnsupportedFormat(filename.to_string()))?;
        Self::from_extension(ext)
    }

    /// Format of a stored resume, judged by its URL path. Stored resumes without a
    /// recognised extension are PDFs.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
        path.rsplit('/')
            .next()
            .and_then(|name| Self::from_filename(name).ok())
            .unwrap_or(DocumentFormat::Pdf)
    }
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Bytes, format: DocumentFormat) -> Result<String, DocumentError>;
}

/// Production extractor. Parsing is CPU-bound, so it runs on the blocking pool.
pub struct DocumentExtractor;

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, bytes: Bytes, format: DocumentFormat) -> Result<String, DocumentError> {
        let size = bytes.len();
        let text = tokio::task::spawn_blocking(move || match format {
            DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| DocumentError::Extraction(e.to_string())),
            DocumentFormat::Docx => docx::extract_text(&bytes),
        })
        .await
        .map_err(|e| DocumentError::Extraction(format!("extraction task failed: {e}")))??;

        debug!(?format, bytes = size, chars = text.len(), "Document text extracted");
        Ok(text)
    }
}
