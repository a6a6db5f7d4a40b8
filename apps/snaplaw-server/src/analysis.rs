//! Document analysis pipeline
//!
//! Upload bytes are classified and turned into text (PDF extraction on the
//! blocking pool, image transcription through the assistant), checked for
//! length, scored by the risk engine and finally annotated with the
//! assistant's prose. Prose failures never fail an analysis; they are replaced
//! with fallback text.

use doc_text::{ensure_analyzable, extract_text, DocumentKind, ExtractedText};
use serde::Serialize;
use shared_types::RiskReport;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assistant::{truncate_chars, AssistantError};
use crate::error::ServerError;
use crate::AppState;

/// Characters of the document echoed back in `original_text`
pub const PREVIEW_CHARS: usize = 1000;

/// Full result of analyzing one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    pub document_id: Uuid,
    /// Unix seconds
    pub analyzed_at: i64,
    pub kind: DocumentKind,
    pub page_count: usize,
    #[serde(flatten)]
    pub report: RiskReport,
    pub summary: String,
    pub simplified_text: String,
    pub key_terms: Vec<String>,
    pub original_text: String,
}

/// Fallback text for one kind of prose output
struct Fallback {
    unavailable: &'static str,
    failed: &'static str,
}

const SUMMARY_FALLBACK: Fallback = Fallback {
    unavailable: "Summary unavailable - AI assistant not configured",
    failed: "Summary could not be generated due to an error.",
};

const SIMPLIFY_FALLBACK: Fallback = Fallback {
    unavailable: "Simplified text unavailable - AI assistant not configured",
    failed: "Text could not be simplified due to an error.",
};

const KEY_TERMS_FALLBACK: Fallback = Fallback {
    unavailable: "Key terms unavailable - AI assistant not configured",
    failed: "Terms could not be extracted",
};

const ANSWER_FALLBACK: Fallback = Fallback {
    unavailable: "Question answering unavailable - AI assistant not configured",
    failed: "I couldn't answer that question due to an error.",
};

impl Fallback {
    fn pick(&self, what: &str, err: &AssistantError) -> &'static str {
        match err {
            AssistantError::NotConfigured => self.unavailable,
            other => {
                warn!(error = %other, "{} failed", what);
                self.failed
            }
        }
    }

    fn or_text(&self, what: &str, result: Result<String, AssistantError>) -> String {
        result.unwrap_or_else(|e| self.pick(what, &e).to_string())
    }
}

/// Turn an uploaded file into text
pub async fn extract_upload(
    state: &AppState,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ExtractedText, ServerError> {
    let kind = DocumentKind::from_filename(filename)?;

    if kind == DocumentKind::Image {
        let text = state
            .assistant
            .transcribe_image(&bytes, kind.mime_type(filename))
            .await
            .map_err(|e| match e {
                AssistantError::NotConfigured => ServerError::Extraction(
                    "Image text extraction requires the AI assistant".to_string(),
                ),
                other => {
                    warn!(error = %other, "Image transcription failed");
                    ServerError::Extraction("Could not read text from the image".to_string())
                }
            })?;
        return Ok(ExtractedText {
            kind,
            text: text.trim().to_string(),
            page_count: 1,
        });
    }

    tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| ServerError::Internal(format!("Extraction task failed: {}", e)))?
        .map_err(ServerError::from)
}

/// Score extracted text and attach the assistant's prose
pub async fn analyze_extracted(
    state: &AppState,
    extracted: ExtractedText,
) -> Result<DocumentAnalysis, ServerError> {
    let text = ensure_analyzable(&extracted.text)?;

    *state.last_document.write().await = Some(text.to_string());

    let report = state.engine.analyze(text);

    let assistant = state.assistant.as_ref();
    let (summary, simplified, key_terms) = tokio::join!(
        assistant.summarize(text),
        assistant.simplify(text),
        assistant.key_terms(text),
    );

    let key_terms = key_terms
        .unwrap_or_else(|e| vec![KEY_TERMS_FALLBACK.pick("Key term extraction", &e).to_string()]);

    let analysis = DocumentAnalysis {
        document_id: Uuid::new_v4(),
        analyzed_at: chrono::Utc::now().timestamp(),
        kind: extracted.kind,
        page_count: extracted.page_count,
        summary: SUMMARY_FALLBACK.or_text("Summary", summary),
        simplified_text: SIMPLIFY_FALLBACK.or_text("Simplification", simplified),
        key_terms,
        original_text: preview(text),
        report,
    };

    info!(
        document_id = %analysis.document_id,
        word_count = analysis.report.word_count,
        risk_score = analysis.report.risk_score,
        findings = analysis.report.risk_clauses.len(),
        "Document analyzed"
    );

    Ok(analysis)
}

/// Answer a question about `document_text`, or the last analyzed document
pub async fn answer_question(
    state: &AppState,
    question: &str,
    document_text: Option<String>,
) -> Result<String, ServerError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ServerError::InvalidRequest("No question provided".to_string()));
    }

    let document = match document_text.filter(|t| !t.trim().is_empty()) {
        Some(text) => text,
        None => state
            .last_document
            .read()
            .await
            .clone()
            .ok_or(ServerError::NoDocument)?,
    };

    let answer = state.assistant.answer(question, &document).await;
    Ok(ANSWER_FALLBACK.or_text("Question answering", answer))
}

/// Leading slice of the document, marked with "..." when cut
pub fn preview(text: &str) -> String {
    let head = truncate_chars(text, PREVIEW_CHARS);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}
