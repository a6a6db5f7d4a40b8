//! Upload classification by file extension

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Extensions accepted for upload
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Text,
}

impl DocumentKind {
    /// Classify an upload from its file name. Matching is case-insensitive
    /// and only the last extension counts.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let name = filename.trim();
        if name.is_empty() {
            return Err(ExtractError::NoFileSelected);
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "jpg" | "jpeg" | "png" => Ok(DocumentKind::Image),
            "txt" => Ok(DocumentKind::Text),
            _ => Err(ExtractError::UnsupportedFileType(name.to_string())),
        }
    }

    /// MIME type used when handing the raw bytes to another service
    pub fn mime_type(self, filename: &str) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Text => "text/plain",
            DocumentKind::Image => {
                if filename.to_lowercase().ends_with(".png") {
                    "image/png"
                } else {
                    "image/jpeg"
                }
            }
        }
    }
}
