use http::HeaderMap;
use thiserror::Error;

use crate::config::ToolServiceConfig;

/// Failure modes of the `/call` authorization pipeline (spec §4.D, steps
/// 1-2 and 4). Each variant carries everything `server.rs` needs to build
/// the matching HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("missing or malformed Authorization header")]
	MissingOrMalformedAuthorization,
	#[error("Invalid token")]
	InvalidToken,
	#[error("permission denied for tool '{tool}'")]
	Forbidden { tool: String },
}

const BEARER_PREFIX: &str = "bearer ";

/// Extracts a bearer token from `Authorization: Bearer <token>`. The
/// scheme match is case-insensitive, per spec §4.D step 1.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let raw = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
	if raw.len() <= BEARER_PREFIX.len() {
		return None;
	}
	let (scheme, token) = raw.split_at(BEARER_PREFIX.len());
	if scheme.eq_ignore_ascii_case(BEARER_PREFIX) && !token.trim().is_empty() {
		Some(token.trim().to_string())
	} else {
		None
	}
}

/// Runs steps 1, 2, and 4 of the `/call` pipeline. Schema validation and
/// tool-existence checks (steps 3 and 5) happen separately in `server.rs`
/// since they apply whether or not auth is enabled.
pub fn authorize(config: &ToolServiceConfig, headers: &HeaderMap, tool: &str) -> Result<(), AuthError> {
	if !config.auth_enabled {
		return Ok(());
	}
	let token = extract_bearer_token(headers).ok_or(AuthError::MissingOrMalformedAuthorization)?;
	if !config.token_exists(&token) {
		return Err(AuthError::InvalidToken);
	}
	if !config.is_permitted(&token, tool) {
		return Err(AuthError::Forbidden { tool: tool.to_string() });
	}
	Ok(())
}
