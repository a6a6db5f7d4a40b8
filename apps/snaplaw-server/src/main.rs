//! SnapLaw Server
//!
//! Accepts contract uploads (PDF, image, plain text), runs rule-based risk
//! analysis over the extracted text and annotates the result with
//! plain-language prose from a hosted language model. Provides REST API
//! endpoints for:
//!
//! - Document analysis (upload or JSON)
//! - Questions about the last analyzed document
//! - Risk category listing
//!
//! ## Architecture
//!
//! Risk detection and scoring live in `risk-engine` and never touch the
//! network; text extraction lives in `doc-text`. The prose assistant is
//! optional: without `GEMINI_API_KEY` the server still scores documents and
//! returns fallback text for the prose fields.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use risk_engine::{RiskCatalog, RiskEngine};
use tokio::sync::RwLock;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod analysis;
mod api;
mod assistant;
mod error;
#[cfg(test)]
mod tests;

use api::{handle_analyze, handle_ask, handle_health, handle_risk_categories, handle_upload};
use assistant::{
    GeminiAssistant, GeminiConfig, ProseAssistant, UnavailableAssistant, DEFAULT_API_BASE,
};

/// Command-line arguments for the SnapLaw server
#[derive(Parser, Debug)]
#[command(name = "snaplaw-server")]
#[command(about = "SnapLaw contract risk analysis server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SNAPLAW_PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "16")]
    max_upload_mb: usize,

    /// JSON file of extra risk categories appended to the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// API key for the Generative Language API
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Model used for summaries, simplification, key terms and OCR
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    gemini_model: String,

    /// Base URL of the Generative Language API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    gemini_api_base: String,

    /// Timeout for assistant requests in seconds
    #[arg(long, default_value = "30")]
    assistant_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RiskEngine>,
    pub assistant: Arc<dyn ProseAssistant>,
    /// Text of the most recently analyzed document, used by `/api/ask`
    pub last_document: Arc<RwLock<Option<String>>>,
    pub max_upload_mb: usize,
}

impl AppState {
    pub fn new(engine: RiskEngine, assistant: Arc<dyn ProseAssistant>, max_upload_mb: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            assistant,
            last_document: Arc::new(RwLock::new(None)),
            max_upload_mb,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Build the application router. Rate limiting is added by `main` since it
/// needs the peer address.
pub fn router(state: AppState) -> Router {
    // Base64 JSON bodies are a third larger than the file they carry
    let body_limit = state.max_upload_bytes() * 2;

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/risk-categories", get(handle_risk_categories))
        .route("/api/analyze", post(handle_analyze))
        .route("/api/upload", post(handle_upload))
        .route("/api/ask", post(handle_ask))
        // Apply middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<RiskCatalog> {
    let standard = RiskCatalog::standard().context("Built-in risk catalog is invalid")?;

    let Some(path) = path else {
        return Ok(standard);
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let custom = RiskCatalog::from_json(&json)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    info!(path = %path.display(), categories = custom.len(), "Loaded extra risk categories");

    standard
        .extend(custom)
        .context("Extra risk categories conflict with the built-in catalog")
}

fn build_assistant(args: &Args) -> anyhow::Result<Arc<dyn ProseAssistant>> {
    match args.gemini_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let assistant = GeminiAssistant::new(GeminiConfig {
                api_key: key.to_string(),
                model: args.gemini_model.clone(),
                api_base: args.gemini_api_base.clone(),
                timeout: Duration::from_secs(args.assistant_timeout_secs),
            })
            .context("Failed to create assistant client")?;
            info!(model = %args.gemini_model, "AI assistant configured");
            Ok(Arc::new(assistant))
        }
        _ => {
            warn!("GEMINI_API_KEY not set; summaries, simplification and image OCR are disabled");
            Ok(Arc::new(UnavailableAssistant))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SnapLaw server on {}:{}", args.host, args.port);

    let catalog = load_catalog(args.catalog.as_ref())?;
    info!(
        categories = catalog.len(),
        patterns = catalog.pattern_count(),
        "Risk catalog ready"
    );

    let assistant = build_assistant(&args)?;
    let state = AppState::new(RiskEngine::new(catalog), assistant, args.max_upload_mb);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let app = router(state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Upload limit: {}MB", args.max_upload_mb);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
