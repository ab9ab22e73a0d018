use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use review_wire::{AgentCard, InvokeParams, InvokeRequestEnvelope, JsonRpcError, JsonRpcErrorCode, JsonRpcResponseEnvelope};
use tower_http::trace::TraceLayer;

use crate::config::AgentSdkConfig;
use crate::skill::SkillHandler;

#[derive(Clone)]
struct AppState {
	config: Arc<AgentSdkConfig>,
	skills: Arc<HashMap<String, Arc<dyn SkillHandler>>>,
}

/// Builds an agent process's axum router:
/// `GET /.well-known/agent-card.json`, `GET /health`, `POST /rpc`.
pub fn build_router(config: AgentSdkConfig, handlers: Vec<Arc<dyn SkillHandler>>) -> Router {
	let skills: HashMap<String, Arc<dyn SkillHandler>> = handlers.into_iter().map(|h| (h.skill().id.clone(), h)).collect();
	let state = AppState { config: Arc::new(config), skills: Arc::new(skills) };
	Router::new()
		.route("/.well-known/agent-card.json", get(agent_card))
		.route("/health", get(health))
		.route("/rpc", post(rpc))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn agent_card(State(state): State<AppState>) -> Json<AgentCard> {
	let mut skills: Vec<_> = state.skills.values().map(|h| h.skill()).collect();
	skills.sort_by(|a, b| a.id.cmp(&b.id));
	Json(AgentCard {
		name: state.config.name.clone(),
		version: state.config.version.clone(),
		protocol_version: state.config.protocol_version.clone(),
		endpoint: state.config.endpoint.clone(),
		skills,
		auth: state.config.auth.clone(),
	})
}

async fn rpc(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
	let envelope: InvokeRequestEnvelope = match serde_json::from_slice(&body) {
		Ok(envelope) => envelope,
		Err(_) => return error_response("", JsonRpcErrorCode::ParseError, "Parse error"),
	};
	if let Err(e) = envelope.validate() {
		return error_response(&envelope.id, JsonRpcErrorCode::InvalidRequest, &e.to_string());
	}
	if envelope.method != "invoke" {
		return error_response(&envelope.id, JsonRpcErrorCode::MethodNotFound, "Method not found");
	}
	let params: InvokeParams = match serde_json::from_value(envelope.params.clone()) {
		Ok(params) => params,
		Err(e) => return error_response(&envelope.id, JsonRpcErrorCode::InvalidParams, &format!("Invalid params: {e}")),
	};
	if let Err(e) = params.validate() {
		return error_response(&envelope.id, JsonRpcErrorCode::InvalidParams, &e.to_string());
	}
	let Some(handler) = state.skills.get(&params.skill) else {
		return error_response(&envelope.id, JsonRpcErrorCode::InvalidParams, &format!("Unknown skill: {}", params.skill));
	};
	match handler.handle(params.input).await {
		Ok(result) => {
			let value = serde_json::to_value(result).expect("AgentResponse always serializes");
			Json(JsonRpcResponseEnvelope::success(envelope.id, value)).into_response()
		},
		Err(message) => error_response(&envelope.id, JsonRpcErrorCode::InternalError, &message),
	}
}

fn error_response(id: &str, code: JsonRpcErrorCode, message: &str) -> Response {
	let status = match code {
		JsonRpcErrorCode::ParseError => StatusCode::BAD_REQUEST,
		JsonRpcErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
		JsonRpcErrorCode::MethodNotFound => StatusCode::NOT_FOUND,
		JsonRpcErrorCode::InvalidParams => StatusCode::BAD_REQUEST,
		JsonRpcErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
		_ => StatusCode::BAD_REQUEST,
	};
	(status, Json(JsonRpcResponseEnvelope::failure(id, JsonRpcError::new(code, message)))).into_response()
}
