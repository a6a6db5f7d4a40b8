//! Tests for the SnapLaw server API
//!
//! Test categories:
//! - Endpoint behavior through axum-test, with a scripted assistant
//! - Error codes for rejected uploads and questions
//! - Property tests for request handling that must never fail open

use std::sync::Arc;

use async_trait::async_trait;

use crate::assistant::{AssistantError, ProseAssistant, UnavailableAssistant};
use crate::{router, AppState};
use risk_engine::RiskEngine;

const LEASE_PDF: &[u8] = include_bytes!("../../../crates/doc-text/tests/fixtures/lease.pdf");

const RISKY_CONTRACT: &str = "Any dispute between the parties shall be settled by binding \
arbitration in Delaware. All payments made under this agreement are non-refundable. The \
customer agrees to pay all fees on time each month.";

/// Assistant with canned replies
struct ScriptedAssistant;

#[async_trait]
impl ProseAssistant for ScriptedAssistant {
    fn is_configured(&self) -> bool {
        true
    }

    async fn summarize(&self, _text: &str) -> Result<String, AssistantError> {
        Ok("A contract with arbitration and no refunds.".to_string())
    }

    async fn simplify(&self, _text: &str) -> Result<String, AssistantError> {
        Ok("You cannot go to court and you cannot get your money back.".to_string())
    }

    async fn key_terms(&self, _text: &str) -> Result<Vec<String>, AssistantError> {
        Ok(vec!["arbitration".to_string(), "refund".to_string()])
    }

    async fn answer(&self, question: &str, document: &str) -> Result<String, AssistantError> {
        Ok(format!(
            "Answer to '{}' from {} chars",
            question,
            document.chars().count()
        ))
    }

    async fn transcribe_image(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<String, AssistantError> {
        Ok(RISKY_CONTRACT.to_string())
    }
}

/// Assistant whose every call fails upstream
struct BrokenAssistant;

#[async_trait]
impl ProseAssistant for BrokenAssistant {
    fn is_configured(&self) -> bool {
        true
    }

    async fn summarize(&self, _text: &str) -> Result<String, AssistantError> {
        Err(AssistantError::EmptyResponse)
    }

    async fn simplify(&self, _text: &str) -> Result<String, AssistantError> {
        Err(AssistantError::EmptyResponse)
    }

    async fn key_terms(&self, _text: &str) -> Result<Vec<String>, AssistantError> {
        Err(AssistantError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })
    }

    async fn answer(&self, _question: &str, _document: &str) -> Result<String, AssistantError> {
        Err(AssistantError::EmptyResponse)
    }

    async fn transcribe_image(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<String, AssistantError> {
        Err(AssistantError::Status {
            status: 429,
            body: r#"{"error":{"message":"Quota exceeded for project 1234"}}"#.to_string(),
        })
    }
}

fn test_state(assistant: Arc<dyn ProseAssistant>) -> AppState {
    AppState::new(RiskEngine::standard().unwrap(), assistant, 1)
}

#[cfg(test)]
mod endpoint_tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn server_with(assistant: Arc<dyn ProseAssistant>) -> TestServer {
        TestServer::new(router(test_state(assistant))).unwrap()
    }

    fn scripted_server() -> TestServer {
        server_with(Arc::new(ScriptedAssistant))
    }

    fn clause_types(analysis: &Value) -> Vec<String> {
        analysis["risk_clauses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["type"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let server = scripted_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "snaplaw-server");
        assert_eq!(body["assistant_configured"], true);
    }

    #[tokio::test]
    async fn test_health_without_assistant() {
        let server = server_with(Arc::new(UnavailableAssistant));
        let body: Value = server.get("/health").await.json();
        assert_eq!(body["assistant_configured"], false);
    }

    #[tokio::test]
    async fn test_risk_categories() {
        let server = scripted_server();
        let response = server.get("/api/risk-categories").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 6);
        assert_eq!(body["categories"][0]["key"], "binding_arbitration");
        assert_eq!(body["categories"][0]["type"], "Binding Arbitration");
        assert_eq!(body["categories"][0]["severity"], "High");
        assert_eq!(body["categories"][0]["pattern_count"], 5);
    }

    #[tokio::test]
    async fn test_analyze_text() {
        let server = scripted_server();
        let response = server
            .post("/api/analyze")
            .json(&json!({ "text": RISKY_CONTRACT }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);

        let analysis = &body["analysis"];
        let types = clause_types(analysis);
        assert!(types.contains(&"Binding Arbitration".to_string()));
        assert!(types.contains(&"Non-refundable".to_string()));

        let risk = analysis["risk_score"].as_f64().unwrap();
        assert!((1.0..=10.0).contains(&risk));
        let complexity = analysis["complexity_score"].as_f64().unwrap();
        assert!((1.0..=10.0).contains(&complexity));

        assert_eq!(analysis["summary"], "A contract with arbitration and no refunds.");
        assert_eq!(analysis["key_terms"], json!(["arbitration", "refund"]));
        assert_eq!(analysis["original_text"], RISKY_CONTRACT);
        assert_eq!(analysis["kind"], "text");
        assert!(analysis["document_id"].as_str().is_some());
        assert!(analysis["analyzed_at"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_analyze_without_assistant_uses_fallbacks() {
        let server = server_with(Arc::new(UnavailableAssistant));
        let body: Value = server
            .post("/api/analyze")
            .json(&json!({ "text": RISKY_CONTRACT }))
            .await
            .json();

        let analysis = &body["analysis"];
        assert_eq!(
            analysis["summary"],
            "Summary unavailable - AI assistant not configured"
        );
        assert_eq!(
            analysis["simplified_text"],
            "Simplified text unavailable - AI assistant not configured"
        );
        assert_eq!(
            analysis["key_terms"],
            json!(["Key terms unavailable - AI assistant not configured"])
        );
        assert!(!clause_types(analysis).is_empty());
    }

    #[tokio::test]
    async fn test_assistant_failures_do_not_fail_analysis() {
        let server = server_with(Arc::new(BrokenAssistant));
        let response = server
            .post("/api/analyze")
            .json(&json!({ "text": RISKY_CONTRACT }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body["analysis"]["summary"],
            "Summary could not be generated due to an error."
        );
        assert_eq!(
            body["analysis"]["key_terms"],
            json!(["Terms could not be extracted"])
        );
    }

    #[tokio::test]
    async fn test_analyze_short_text_is_rejected() {
        let server = scripted_server();
        let response = server
            .post("/api/analyze")
            .json(&json!({ "text": "Too short to matter." }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "DOCUMENT_TOO_SHORT");
    }

    #[tokio::test]
    async fn test_analyze_base64_text_file() {
        let server = scripted_server();
        let response = server
            .post("/api/analyze")
            .json(&json!({
                "filename": "terms.txt",
                "content_base64": STANDARD.encode(RISKY_CONTRACT),
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert!(clause_types(&body["analysis"]).contains(&"Binding Arbitration".to_string()));
    }

    #[tokio::test]
    async fn test_analyze_rejects_unsupported_extension() {
        let server = scripted_server();
        let response = server
            .post("/api/analyze")
            .json(&json!({
                "filename": "terms.docx",
                "content_base64": STANDARD.encode(RISKY_CONTRACT),
            }))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_base64() {
        let server = scripted_server();
        let response = server
            .post("/api/analyze")
            .json(&json!({ "filename": "terms.txt", "content_base64": "not base64!!" }))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_analyze_requires_a_document() {
        let server = scripted_server();
        let response = server.post("/api/analyze").json(&json!({})).await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_upload_text_file() {
        let server = scripted_server();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(RISKY_CONTRACT.as_bytes().to_vec())
                .file_name("terms.txt")
                .mime_type("text/plain"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert!(clause_types(&body["analysis"]).contains(&"Non-refundable".to_string()));
    }

    #[tokio::test]
    async fn test_upload_image_is_transcribed() {
        let server = scripted_server();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0x89, b'P', b'N', b'G'])
                .file_name("scan.png")
                .mime_type("image/png"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["analysis"]["kind"], "image");
        assert!(clause_types(&body["analysis"]).contains(&"Binding Arbitration".to_string()));
    }

    #[tokio::test]
    async fn test_upload_image_without_assistant_fails_extraction() {
        let server = server_with(Arc::new(UnavailableAssistant));
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("scan.jpg")
                .mime_type("image/jpeg"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_upload_image_transcription_error_hides_upstream_detail() {
        let server = server_with(Arc::new(BrokenAssistant));
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0x89, b'P', b'N', b'G'])
                .file_name("scan.png")
                .mime_type("image/png"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["code"], "EXTRACTION_FAILED");
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("Quota"), "{}", message);
        assert!(!message.contains("429"), "{}", message);
    }

    #[tokio::test]
    async fn test_upload_pdf_file() {
        let server = scripted_server();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(LEASE_PDF.to_vec())
                .file_name("lease.pdf")
                .mime_type("application/pdf"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status_ok();

        let body: Value = response.json();
        let analysis = &body["analysis"];
        assert_eq!(analysis["kind"], "pdf");
        assert_eq!(analysis["page_count"], 1);
        assert!(clause_types(analysis).contains(&"Non-refundable".to_string()));
        assert!(analysis["original_text"]
            .as_str()
            .unwrap()
            .contains("residential"));
    }

    #[tokio::test]
    async fn test_upload_corrupt_pdf() {
        let server = scripted_server();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"not a pdf at all, just some bytes".to_vec())
                .file_name("lease.pdf")
                .mime_type("application/pdf"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let server = scripted_server();
        let form = MultipartForm::new().add_text("note", "no file here");

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "NO_FILE");
    }

    #[tokio::test]
    async fn test_upload_over_limit() {
        let server = scripted_server();
        // Limit is 1 MB in tests
        let oversized = "a".repeat(1024 * 1024 + 1);
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(oversized.into_bytes()).file_name("big.txt"),
        );

        let response = server.post("/api/upload").multipart(form).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let body: Value = response.json();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_ask_before_any_document() {
        let server = scripted_server();
        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "Can I get a refund?" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let body: Value = response.json();
        assert_eq!(body["code"], "NO_DOCUMENT");
    }

    #[tokio::test]
    async fn test_ask_uses_last_analyzed_document() {
        let server = scripted_server();
        server
            .post("/api/analyze")
            .json(&json!({ "text": RISKY_CONTRACT }))
            .await
            .assert_status_ok();

        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "Can I get a refund?" }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(
            body["answer"],
            format!(
                "Answer to 'Can I get a refund?' from {} chars",
                RISKY_CONTRACT.chars().count()
            )
        );
    }

    #[tokio::test]
    async fn test_ask_with_explicit_document() {
        let server = scripted_server();
        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "Who pays?", "document_text": "The tenant pays." }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["answer"], "Answer to 'Who pays?' from 16 chars");
    }

    #[tokio::test]
    async fn test_ask_requires_question() {
        let server = scripted_server();
        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "   ", "document_text": RISKY_CONTRACT }))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::analysis::{answer_question, preview, PREVIEW_CHARS};
    use crate::assistant::{parse_key_terms, MAX_KEY_TERMS};
    use crate::error::ServerError;
    use doc_text::DocumentKind;
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn preview_never_exceeds_limit(text in any::<String>()) {
            let shown = preview(&text);
            prop_assert!(shown.chars().count() <= PREVIEW_CHARS + 3);
            if text.chars().count() <= PREVIEW_CHARS {
                prop_assert_eq!(shown, text);
            }
        }

        #[test]
        fn key_terms_are_capped_and_trimmed(raw in "[a-z ,]{0,400}") {
            let terms = parse_key_terms(&raw);
            prop_assert!(terms.len() <= MAX_KEY_TERMS);
            for term in terms {
                prop_assert!(!term.is_empty());
                prop_assert_eq!(term.trim(), term.as_str());
            }
        }

        #[test]
        fn unknown_extensions_are_rejected(stem in "[a-z]{1,10}", ext in "[a-z]{2,5}") {
            prop_assume!(!doc_text::ALLOWED_EXTENSIONS.contains(&ext.as_str()));
            let name = format!("{}.{}", stem, ext);
            prop_assert!(DocumentKind::from_filename(&name).is_err());
        }

        #[test]
        fn blank_questions_are_rejected(question in "[ \t\n]{0,10}") {
            let state = test_state(Arc::new(ScriptedAssistant));
            let result = runtime().block_on(answer_question(
                &state,
                &question,
                Some(RISKY_CONTRACT.to_string()),
            ));
            prop_assert!(matches!(result, Err(ServerError::InvalidRequest(_))));
        }
    }
}
