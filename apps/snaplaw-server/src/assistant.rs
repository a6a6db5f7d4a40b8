//! Plain-language assistance from a hosted language model
//!
//! Summaries, simplified text, key terms, answers and image transcription are
//! delegated to Google's Generative Language API. None of this feeds the risk
//! scores; when no API key is configured the [`UnavailableAssistant`] stands in
//! and the analysis still completes.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Characters of document text sent with each kind of prompt
pub const SUMMARY_CONTEXT_CHARS: usize = 3000;
pub const SIMPLIFY_CONTEXT_CHARS: usize = 3000;
pub const KEY_TERMS_CONTEXT_CHARS: usize = 2000;
pub const ANSWER_CONTEXT_CHARS: usize = 4000;

pub const MAX_KEY_TERMS: usize = 15;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant is not configured")]
    NotConfigured,

    #[error("Request to assistant failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Assistant returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Assistant returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait ProseAssistant: Send + Sync {
    /// False when every call will fail with [`AssistantError::NotConfigured`]
    fn is_configured(&self) -> bool;

    async fn summarize(&self, text: &str) -> Result<String, AssistantError>;

    async fn simplify(&self, text: &str) -> Result<String, AssistantError>;

    async fn key_terms(&self, text: &str) -> Result<Vec<String>, AssistantError>;

    async fn answer(&self, question: &str, document: &str) -> Result<String, AssistantError>;

    /// Read the text out of an image of a document
    async fn transcribe_image(&self, image: &[u8], mime_type: &str)
        -> Result<String, AssistantError>;
}

/// Stand-in used when no API key is available
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAssistant;

#[async_trait]
impl ProseAssistant for UnavailableAssistant {
    fn is_configured(&self) -> bool {
        false
    }

    async fn summarize(&self, _text: &str) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }

    async fn simplify(&self, _text: &str) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }

    async fn key_terms(&self, _text: &str) -> Result<Vec<String>, AssistantError> {
        Err(AssistantError::NotConfigured)
    }

    async fn answer(&self, _question: &str, _document: &str) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }

    async fn transcribe_image(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }
}

/// Settings for [`GeminiAssistant`]
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Client for the `generateContent` endpoint
pub struct GeminiAssistant {
    client: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    Text(&'a str),
    InlineData { mime_type: &'a str, data: String },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiAssistant {
    pub fn new(config: GeminiConfig) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    #[instrument(skip(self, parts), fields(model = %self.config.model))]
    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String, AssistantError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = response_text(parsed).ok_or(AssistantError::EmptyResponse)?;
        debug!(chars = text.len(), "Assistant responded");
        Ok(text)
    }

    async fn prompt(&self, prompt: &str) -> Result<String, AssistantError> {
        self.generate(vec![Part::Text(prompt)]).await
    }
}

fn response_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl ProseAssistant for GeminiAssistant {
    fn is_configured(&self) -> bool {
        true
    }

    async fn summarize(&self, text: &str) -> Result<String, AssistantError> {
        self.prompt(&summary_prompt(text)).await
    }

    async fn simplify(&self, text: &str) -> Result<String, AssistantError> {
        self.prompt(&simplify_prompt(text)).await
    }

    async fn key_terms(&self, text: &str) -> Result<Vec<String>, AssistantError> {
        let raw = self.prompt(&key_terms_prompt(text)).await?;
        Ok(parse_key_terms(&raw))
    }

    async fn answer(&self, question: &str, document: &str) -> Result<String, AssistantError> {
        self.prompt(&answer_prompt(question, document)).await
    }

    async fn transcribe_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, AssistantError> {
        let parts = vec![
            Part::Text(TRANSCRIBE_PROMPT),
            Part::InlineData {
                mime_type,
                data: STANDARD.encode(image),
            },
        ];
        self.generate(parts).await
    }
}

const TRANSCRIBE_PROMPT: &str = "Extract all text from this image. If it is a legal document \
or contract, keep its formatting and structure. Return only the extracted text.";

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Write a brief, clear summary of this legal document in plain English. \
         Cover the key points, obligations and important terms in at most 200 words.\n\n\
         Document:\n{}\n\nSummary:",
        truncate_chars(text, SUMMARY_CONTEXT_CHARS)
    )
}

fn simplify_prompt(text: &str) -> String {
    format!(
        "Rewrite the following legal text in plain English that anyone can understand. \
         Keep the meaning intact but use simple words, shorter sentences and everyday language.\n\n\
         Legal text:\n{}\n\nSimplified version:",
        truncate_chars(text, SIMPLIFY_CONTEXT_CHARS)
    )
}

fn key_terms_prompt(text: &str) -> String {
    format!(
        "List the most important legal terms and concepts in this document as a single \
         comma-separated line of at most {} terms. Focus on obligations, rights, penalties \
         and key concepts.\n\nDocument:\n{}\n\nKey terms:",
        MAX_KEY_TERMS,
        truncate_chars(text, KEY_TERMS_CONTEXT_CHARS)
    )
}

fn answer_prompt(question: &str, document: &str) -> String {
    format!(
        "Answer this question about the legal document below accurately and concisely.\n\n\
         Question: {}\n\nDocument:\n{}\n\nAnswer:",
        question,
        truncate_chars(document, ANSWER_CONTEXT_CHARS)
    )
}

/// Split a comma-separated model reply into at most [`MAX_KEY_TERMS`] terms
pub fn parse_key_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_KEY_TERMS)
        .map(str::to_string)
        .collect()
}
