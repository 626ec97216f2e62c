//! PDF text extraction for uploaded candidate CVs.
//!
//! Pages are extracted independently: a page that yields no text or fails
//! to decode contributes nothing instead of failing the whole document.
//! Truncation of the extracted text happens downstream, when the excerpt
//! is embedded into the model prompt.

use thiserror::Error;
use tracing::debug;

/// The uploaded bytes are not a well-formed PDF document.
#[derive(Debug, Error)]
#[error("not a well-formed PDF document: {0}")]
pub struct ExtractionError(#[from] lopdf::Error);

/// Extracts plain text from a PDF byte stream, joining per-page text with
/// a newline. Per-page extraction failures are skipped silently.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes)?;

    let mut pages_text: Vec<String> = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => {
                pages_text.push(text.trim_end().to_string());
            }
            Ok(_) => {}
            Err(e) => {
                debug!("page {page_number}: text extraction failed ({e}), skipping");
            }
        }
    }

    Ok(pages_text.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_pdf_bytes_fail_extraction() {
        let result = extract_pdf_text(b"this is definitely not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input_fails_extraction() {
        let result = extract_pdf_text(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_header_fails_extraction() {
        // A bare PDF magic header with no body is not a well-formed document
        let result = extract_pdf_text(b"%PDF-1.7\n");
        assert!(result.is_err());
    }
}
