//! Text extraction from uploaded bytes
//!
//! PDFs go through `pdf-extract`, plain text is decoded as lossy UTF-8.
//! Images have no text layer; they are reported as [`ExtractError::NeedsOcr`]
//! so the caller can route them to an OCR service.

use pdf_extract::extract_text_from_mem;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::kind::DocumentKind;

/// Documents shorter than this (after trimming) are not worth analyzing
pub const MIN_ANALYZABLE_CHARS: usize = 50;

/// Text pulled out of an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub kind: DocumentKind,
    /// Full document text, trimmed
    pub text: String,
    /// Number of pages for PDFs, 1 otherwise
    pub page_count: usize,
}

/// Extract text from an upload of a known kind
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Text => Ok(ExtractedText {
            kind,
            text: decode_text(bytes),
            page_count: 1,
        }),
        DocumentKind::Image => Err(ExtractError::NeedsOcr),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::InvalidPdf("Empty PDF bytes".to_string()));
    }

    let raw_text = extract_text_from_mem(bytes).map_err(|e| {
        let message = e.to_string();
        warn!(error = %message, "PDF text extraction failed");
        classify_pdf_error(message)
    })?;

    let pages = split_pages(&raw_text);
    if pages.is_empty() {
        return Err(ExtractError::ScannedPdf);
    }

    debug!(pages = pages.len(), chars = raw_text.len(), "Extracted PDF text");

    Ok(ExtractedText {
        kind: DocumentKind::Pdf,
        text: pages.join("\n"),
        page_count: pages.len(),
    })
}

/// Map a pdf-extract error message onto the error the caller can act on
fn classify_pdf_error(message: String) -> ExtractError {
    let lowered = message.to_lowercase();
    if lowered.contains("encrypted") || lowered.contains("password") {
        ExtractError::PasswordProtected
    } else if lowered.contains("invalid")
        || lowered.contains("malformed")
        || lowered.contains("corrupt")
    {
        ExtractError::InvalidPdf(message)
    } else {
        ExtractError::ExtractionFailed(message)
    }
}

/// Decode plain text, dropping byte sequences that are not valid UTF-8
fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split extracted PDF text on form feeds, dropping blank pages
fn split_pages(text: &str) -> Vec<&str> {
    text.split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect()
}

/// Reject text too short to carry a meaningful analysis
pub fn ensure_analyzable(text: &str) -> Result<&str, ExtractError> {
    if text.trim().chars().count() < MIN_ANALYZABLE_CHARS {
        return Err(ExtractError::TooShort);
    }
    Ok(text)
}
