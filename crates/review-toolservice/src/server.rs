use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use review_wire::{JsonRpcErrorCode, ToolCallRequest, ToolCatalog};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::auth::{authorize, AuthError};
use crate::config::ToolServiceConfig;
use crate::registry::ToolRegistry;

#[derive(Clone)]
struct AppState {
	config: Arc<ToolServiceConfig>,
	registry: Arc<ToolRegistry>,
}

/// Builds the tool service's axum router: `GET /tools`, `POST /call`,
/// `GET /health`.
pub fn build_router(config: Arc<ToolServiceConfig>, registry: Arc<ToolRegistry>) -> Router {
	let state = AppState { config, registry };
	Router::new()
		.route("/tools", get(list_tools))
		.route("/call", post(call_tool))
		.route("/health", get(health))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolCatalog> {
	Json(state.registry.catalog())
}

async fn call_tool(State(state): State<AppState>, headers: HeaderMap, body: axum::body::Bytes) -> Response {
	// Steps 1-2: extract and look up the bearer token (skipped entirely
	// when auth is disabled for testing). The permission check (step 4)
	// needs the tool name, so it runs after body parsing below.
	if state.config.auth_enabled {
		if let Err(err) = preauth(&state.config, &headers) {
			return err.into_response();
		}
	}

	// Step 3: body parse and schema check.
	let request: ToolCallRequest = match serde_json::from_slice(&body) {
		Ok(request) => request,
		Err(e) => {
			return (
				StatusCode::BAD_REQUEST,
				Json(json!({"ok": false, "stderr": format!("Malformed request body: {e}"), "error_code": JsonRpcErrorCode::ParseError.code()})),
			)
				.into_response();
		},
	};
	if request.tool.trim().is_empty() {
		return (
			StatusCode::BAD_REQUEST,
			Json(json!({"ok": false, "stderr": "Missing required field: tool", "error_code": JsonRpcErrorCode::InvalidParams.code()})),
		)
			.into_response();
	}

	// Step 4: tool-permission check.
	if state.config.auth_enabled {
		if let Err(err) = authorize(&state.config, &headers, &request.tool) {
			return err.into_response();
		}
	}

	// Step 5: tool-existence check against the allowlist.
	if !state.registry.exists(&request.tool) {
		return (
			StatusCode::BAD_REQUEST,
			Json(json!({"ok": false, "stdout": "", "stderr": format!("Unknown tool: {}", request.tool)})),
		)
			.into_response();
	}

	// Step 6: execute and return the handler's response verbatim, always
	// HTTP 200 from here on regardless of `ok`.
	let response = state.registry.call(&request.tool, request.args).await.expect("existence checked above");
	(StatusCode::OK, Json(response)).into_response()
}

/// Runs steps 1-2 only (no tool name is known yet at this point in the
/// pipeline).
fn preauth(config: &ToolServiceConfig, headers: &HeaderMap) -> Result<(), AuthError> {
	let token = crate::auth::extract_bearer_token(headers).ok_or(AuthError::MissingOrMalformedAuthorization)?;
	if !config.token_exists(&token) {
		return Err(AuthError::InvalidToken);
	}
	Ok(())
}

impl IntoResponse for AuthError {
	fn into_response(self) -> Response {
		match self {
			AuthError::MissingOrMalformedAuthorization => (
				StatusCode::UNAUTHORIZED,
				Json(json!({"ok": false, "stderr": "Missing or malformed Authorization header", "error_code": JsonRpcErrorCode::Unauthorized.code()})),
			)
				.into_response(),
			AuthError::InvalidToken => (
				StatusCode::UNAUTHORIZED,
				Json(json!({"ok": false, "stderr": "Invalid token", "error_code": JsonRpcErrorCode::Unauthorized.code()})),
			)
				.into_response(),
			AuthError::Forbidden { tool } => (
				StatusCode::FORBIDDEN,
				Json(json!({"ok": false, "stderr": format!("Token lacks permission for tool '{tool}'"), "error_code": JsonRpcErrorCode::Forbidden.code()})),
			)
				.into_response(),
		}
	}
}
