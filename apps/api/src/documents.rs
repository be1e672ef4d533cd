//! Document extraction boundary: PDF bytes in, concatenated page text out.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Not a PDF document")]
    NotPdf,

    #[error("Could not extract text: {0}")]
    Extraction(String),

    #[error("Document contains no extractable text")]
    NoText,
}

const PDF_MAGIC: &[u8] = b"%PDF-";

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    if bytes.is_empty() {
        return Err(DocumentError::Empty);
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(DocumentError::NotPdf);
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(DocumentError::NoText);
    }

    debug!("Extracted {} chars from {} byte PDF", text.len(), bytes.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_upload_rejected() {
        assert!(matches!(extract_pdf_text(b""), Err(DocumentError::Empty)));
    }

    #[test]
    fn test_non_pdf_rejected() {
        assert!(matches!(
            extract_pdf_text(b"Just a plain text resume"),
            Err(DocumentError::NotPdf)
        ));
    }
}
