//! Error types for the SnapLaw server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doc_text::ExtractError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Document appears to be empty or too short to analyze")]
    DocumentTooShort,

    #[error("Could not extract text: {0}")]
    Extraction(String),

    #[error("No document analyzed yet")]
    NoDocument,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File too large. Maximum size is {0}MB.")]
    PayloadTooLarge(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::NoFile => (StatusCode::BAD_REQUEST, "NO_FILE"),
            ServerError::UnsupportedFileType(_) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FILE_TYPE")
            }
            ServerError::DocumentTooShort => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DOCUMENT_TOO_SHORT")
            }
            ServerError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED"),
            ServerError::NoDocument => (StatusCode::CONFLICT, "NO_DOCUMENT"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ExtractError> for ServerError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NoFileSelected => ServerError::NoFile,
            ExtractError::UnsupportedFileType(name) => ServerError::UnsupportedFileType(name),
            ExtractError::TooShort => ServerError::DocumentTooShort,
            other => ServerError::Extraction(other.to_string()),
        }
    }
}
