//! Axum-based HTTP gateway exposing the research agent.
//!
//! Routes:
//! - `GET /` and `GET /health`: liveness check
//! - `POST /api/query`: answer a question
//!
//! Every route sits behind a 64KB body limit and a request timeout derived
//! from the configured backend timeouts (see [`request_timeout`]).

use crate::agent::ResearchAgent;
use crate::config::Config;
use crate::util::log_preview;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use uuid::Uuid;

/// Maximum request body size (64KB).
pub const MAX_BODY_SIZE: usize = 65_536;
/// Model calls on the slowest path: decision, keywords, synthesis.
const MAX_MODEL_CALLS: u64 = 3;
/// Slack on top of the backend timeouts for connect and local work.
pub const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 30;

/// Shared state for all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ResearchAgent>,
}

/// Body of `POST /api/query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_use_web_search")]
    pub use_web_search: bool,
}

fn default_use_web_search() -> bool {
    true
}

/// Build the CORS layer for the configured browser origins.
///
/// Credentials are allowed, so methods and headers are mirrored from the
/// preflight request rather than wildcarded.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // A wildcard cannot be combined with credentials.
            Ok(value) if value == "*" => {
                tracing::warn!("Ignoring wildcard CORS origin; list origins explicitly");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Gateway request timeout for `config`.
///
/// Strictly longer than the slowest pipeline the backend timeouts allow, so
/// a run whose every call finishes in time always returns its result.
pub fn request_timeout(config: &Config) -> Duration {
    let pipeline_secs = MAX_MODEL_CALLS
        .saturating_mul(config.provider.timeout_secs)
        .saturating_add(config.search.timeout_secs);
    Duration::from_secs(pipeline_secs.saturating_add(REQUEST_TIMEOUT_MARGIN_SECS))
}

/// Assemble the router with all middleware.
pub fn build_router(state: AppState, cors_origins: &[String], timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handle_health))
        .route("/health", get(handle_health))
        .route("/api/query", post(handle_query))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(cors_layer(cors_origins))
}

/// Run the HTTP gateway until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    if config.provider.api_key.is_none() {
        tracing::warn!("ZEABUR_API_TOKEN is not set; completion requests will be rejected");
    }
    if config.search.api_key.is_none() {
        tracing::warn!("BRIGHTDATA_API_TOKEN is not set; web searches will fail");
    }

    let agent = ResearchAgent::from_config(&config).context("Failed to build research agent")?;
    let state = AppState {
        agent: Arc::new(agent),
    };

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let actual_addr = listener.local_addr()?;

    let timeout = request_timeout(&config);
    tracing::info!(
        addr = %actual_addr,
        model = %config.provider.model,
        cors_origins = ?config.gateway.cors_origins,
        timeout_secs = timeout.as_secs(),
        "Deep research gateway listening"
    );

    let app = build_router(state, &config.gateway.cors_origins, timeout);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

// ══════════════════════════════════════════════════════════════════════════════
// AXUM HANDLERS
// ══════════════════════════════════════════════════════════════════════════════

/// GET / and GET /health
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/query: run the research agent on one question
async fn handle_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("Query JSON parse error: {e}");
            // Body-limit failures keep their 413; every other rejection is a 400.
            let status = match &e {
                JsonRejection::BytesRejection(_) => e.status(),
                _ => StatusCode::BAD_REQUEST,
            };
            let err = serde_json::json!({
                "detail": format!("Invalid request body: {}", e.body_text())
            });
            return (status, Json(err)).into_response();
        }
    };

    if request.query.trim().is_empty() {
        let err = serde_json::json!({ "detail": "Query cannot be empty" });
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        use_web_search = request.use_web_search,
        "Received query: {}",
        log_preview(&request.query)
    );

    let result = state
        .agent
        .answer(&request.query, request.use_web_search)
        .await;

    tracing::info!(
        %request_id,
        used_search = result.used_search,
        sources = result.search_results.len(),
        "Query answered"
    );

    (StatusCode::OK, Json(result)).into_response()
}
