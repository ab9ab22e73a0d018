use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use review_breaker::CircuitBreakerTable;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::run_review;

#[derive(Clone)]
struct AppState {
	client: reqwest::Client,
	config: Arc<OrchestratorConfig>,
	breaker: Arc<CircuitBreakerTable>,
}

/// Builds the orchestrator's axum router: `POST /reviews`, `GET /health`.
/// A thin adapter over [`run_review`] — no domain logic lives here.
pub fn build_router(config: Arc<OrchestratorConfig>, breaker: Arc<CircuitBreakerTable>) -> Router {
	let state = AppState { client: reqwest::Client::new(), config, breaker };
	Router::new().route("/reviews", post(post_reviews)).route("/health", get(health)).layer(TraceLayer::new_for_http()).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
	diff: String,
	mcp_url: String,
	agent_urls: Vec<String>,
}

async fn post_reviews(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
	match handle_reviews(state, &body).await {
		Ok(response) => response,
		Err(error) => error.into_response(),
	}
}

async fn handle_reviews(state: AppState, body: &[u8]) -> Result<Response, OrchestratorError> {
	let request: ReviewRequest = serde_json::from_slice(body)?;
	if request.agent_urls.is_empty() {
		return Err(OrchestratorError::EmptyAgentUrls);
	}

	let merged = run_review(&state.client, &request.agent_urls, &request.diff, &request.mcp_url, &state.config, Arc::clone(&state.breaker)).await;
	Ok((StatusCode::OK, Json(merged)).into_response())
}
