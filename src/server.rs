//! Trait Analyzer HTTP Server
//!
//! Endpoints:
//! ```text
//! POST /api/analyze        text -> six trait scores
//! GET  /api/prompts/list   preset prompts loaded at startup
//! GET  /health             liveness
//! ```
//!
//! Handlers are stateless. The only shared state is the immutable
//! `AppState` built once in `main`.

use crate::analysis::{Analyzer, TraitScores};
use crate::error::AnalysisError;
use crate::llm_client::{AnthropicClient, LlmConfig};
use crate::prompts::PromptCatalog;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// SERVER STATE
// ============================================================================

pub struct AppState {
    pub analyzer: Analyzer,
    pub prompts: PromptCatalog,
}

impl AppState {
    pub fn new(analyzer: Analyzer, prompts: PromptCatalog) -> Self {
        Self { analyzer, prompts }
    }

    /// Build state backed by the Anthropic client
    pub fn from_config(llm: LlmConfig, prompts: PromptCatalog) -> anyhow::Result<Self> {
        let client = AnthropicClient::new(llm)?;
        Ok(Self::new(Analyzer::new(Arc::new(client)), prompts))
    }
}

// ============================================================================
// /api/analyze ENDPOINT
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /api/analyze - Score the caller's text on six traits
///
/// The body is decoded as JSON whatever its content type. An undecodable
/// body counts as missing text, so every input problem answers 400.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TraitScores>, AnalysisError> {
    let text = match serde_json::from_slice::<AnalyzeRequest>(&body) {
        Ok(req) => req.text.unwrap_or_default(),
        Err(e) => {
            debug!("Unreadable analyze body: {}", e);
            String::new()
        }
    };

    let scores = state.analyzer.analyze(&text).await?;
    info!("Analysis complete ({} chars of input)", text.chars().count());
    Ok(Json(scores))
}

// ============================================================================
// /api/prompts/list ENDPOINT
// ============================================================================

/// GET /api/prompts/list - `{ "prompts": [...] }`
pub async fn list_prompts(State(state): State<Arc<AppState>>) -> Json<PromptCatalog> {
    Json(state.prompts.clone())
}

// ============================================================================
// /health ENDPOINT
// ============================================================================

pub async fn health_check() -> &'static str {
    "OK"
}

// ============================================================================
// SERVER STARTUP
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .route("/api/prompts/list", get(list_prompts))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let prompt_count = state.prompts.len();
    let app = router(Arc::new(state));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║                  Trait Analyzer - HTTP API                   ║");
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Listening on: {:44} ║", addr);
    info!("║  Prompt presets: {:<42} ║", prompt_count);
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Endpoints:                                                  ║");
    info!("║    POST /api/analyze      - Trait analysis of free text      ║");
    info!("║    GET  /api/prompts/list - Preset prompts                   ║");
    info!("║    GET  /health           - Health check                     ║");
    info!("╚══════════════════════════════════════════════════════════════╝");

    axum::serve(listener, app).await?;

    Ok(())
}
