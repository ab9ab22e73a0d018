use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors raised while handling `POST /reviews`, before a review is ever
/// attempted.
#[derive(Error, Debug)]
pub enum OrchestratorError {
	#[error("malformed request body: {0}")]
	MalformedBody(#[from] serde_json::Error),

	#[error("agent_urls must be non-empty")]
	EmptyAgentUrls,
}

impl IntoResponse for OrchestratorError {
	fn into_response(self) -> Response {
		(StatusCode::BAD_REQUEST, Json(json!({"error": self.to_string()}))).into_response()
	}
}
