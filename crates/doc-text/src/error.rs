use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Password-protected PDF")]
    PasswordProtected,

    #[error("PDF contains no extractable text - it may be a scanned image")]
    ScannedPdf,

    #[error("PDF extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Image documents require OCR")]
    NeedsOcr,

    #[error("Document appears to be empty or too short to analyze")]
    TooShort,
}
