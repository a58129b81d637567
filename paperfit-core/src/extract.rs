//! Plain-text extraction from uploaded documents.
//!
//! The extractor is a trait so the pipeline can be driven without real PDF
//! fixtures; `PdfTextExtractor` is the production implementation backed by
//! the pure-Rust `pdf-extract` crate.

use crate::error::ExtractError;

/// Turns a binary document into its plain-text content.
pub trait TextExtractor: Send + Sync {
    /// Extract text from `bytes`. `name` identifies the upload in error messages.
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extracts text from PDF documents held in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::Empty {
                name: name.to_string(),
            });
        }
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns `text` as-is. Useful when the upload is already plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// The first `max_chars` characters of `text`, counted as Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
