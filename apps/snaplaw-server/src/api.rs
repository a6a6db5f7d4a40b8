//! API handlers for the SnapLaw server
//!
//! Provides REST endpoints for:
//! - Document analysis (JSON text, base64 file, multipart upload)
//! - Questions about the analyzed document
//! - Risk category listing

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use doc_text::{DocumentKind, ExtractedText};
use serde::{Deserialize, Serialize};
use shared_types::Severity;
use tracing::{debug, info};

use crate::analysis::{analyze_extracted, answer_question, extract_upload, DocumentAnalysis};
use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub assistant_configured: bool,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "snaplaw-server",
        version: env!("CARGO_PKG_VERSION"),
        assistant_configured: state.assistant.is_configured(),
    })
}

/// Risk category list response
#[derive(Serialize)]
pub struct RiskCategoriesResponse {
    pub success: bool,
    pub categories: Vec<RiskCategoryInfo>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct RiskCategoryInfo {
    pub key: String,
    #[serde(rename = "type")]
    pub display_type: String,
    pub severity: Severity,
    pub explanation: String,
    pub pattern_count: usize,
}

/// Handler: GET /api/risk-categories
pub async fn handle_risk_categories(State(state): State<AppState>) -> Json<RiskCategoriesResponse> {
    let categories: Vec<RiskCategoryInfo> = state
        .engine
        .catalog()
        .iter()
        .map(|c| RiskCategoryInfo {
            key: c.key().to_string(),
            display_type: c.display_type().to_string(),
            severity: c.severity(),
            explanation: c.explanation().to_string(),
            pattern_count: c.patterns().len(),
        })
        .collect();

    let count = categories.len();

    Json(RiskCategoriesResponse {
        success: true,
        categories,
        count,
    })
}

/// Analyze request: either raw text, or a file sent as base64
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_base64: Option<String>,
}

/// Analysis response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: DocumentAnalysis,
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let extracted = match request {
        AnalyzeRequest {
            text: Some(text), ..
        } => {
            debug!(chars = text.len(), "Analyzing inline text");
            ExtractedText {
                kind: DocumentKind::Text,
                text: text.trim().to_string(),
                page_count: 1,
            }
        }
        AnalyzeRequest {
            filename: Some(filename),
            content_base64: Some(content),
            ..
        } => {
            let bytes = STANDARD
                .decode(content.trim())
                .map_err(|e| ServerError::InvalidRequest(format!("Invalid base64 content: {}", e)))?;
            check_upload_size(&state, bytes.len())?;
            info!(filename = %filename, bytes = bytes.len(), "Analyzing encoded file");
            extract_upload(&state, &filename, bytes).await?
        }
        _ => {
            return Err(ServerError::InvalidRequest(
                "Provide either text or filename with content_base64".to_string(),
            ))
        }
    };

    let analysis = analyze_extracted(&state, extracted).await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

/// Handler: POST /api/upload
///
/// Expects a multipart form with the document in a field named `file`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&state, e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(&state, e))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or(ServerError::NoFile)?;
    check_upload_size(&state, bytes.len())?;
    info!(filename = %filename, bytes = bytes.len(), "Analyzing uploaded file");

    let extracted = extract_upload(&state, &filename, bytes.to_vec()).await?;
    let analysis = analyze_extracted(&state, extracted).await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

/// Question request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    /// Document to ask about; defaults to the last analyzed document
    #[serde(default)]
    pub document_text: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub success: bool,
    pub answer: String,
}

/// Handler: POST /api/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ServerError> {
    let answer = answer_question(&state, &request.question, request.document_text).await?;
    Ok(Json(AskResponse {
        success: true,
        answer,
    }))
}

fn check_upload_size(state: &AppState, len: usize) -> Result<(), ServerError> {
    if len > state.max_upload_bytes() {
        return Err(ServerError::PayloadTooLarge(state.max_upload_mb));
    }
    Ok(())
}

fn multipart_error(state: &AppState, err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(state.max_upload_mb)
    } else {
        ServerError::InvalidRequest(err.body_text())
    }
}
