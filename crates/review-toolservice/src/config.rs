use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

/// Process-wide tool-service configuration, built once at construction per
/// the design note in spec §9 — never read from the environment at a call
/// site.
#[derive(Debug, Clone)]
pub struct ToolServiceConfig {
	/// When `false`, the bearer-token steps of the authorization pipeline
	/// are skipped (schema and tool-existence checks still run). Exists
	/// for local testing only.
	pub auth_enabled: bool,
	/// `token -> set of permitted tool names`. Tokens absent from this map
	/// are invalid.
	pub token_permissions: HashMap<String, HashSet<String>>,
	pub bind_addr: SocketAddr,
}

impl ToolServiceConfig {
	pub fn is_permitted(&self, token: &str, tool: &str) -> bool {
		self.token_permissions.get(token).map(|tools| tools.contains(tool)).unwrap_or(false)
	}

	pub fn token_exists(&self, token: &str) -> bool {
		self.token_permissions.contains_key(token)
	}
}

impl Default for ToolServiceConfig {
	fn default() -> Self {
		Self {
			auth_enabled: true,
			token_permissions: HashMap::new(),
			bind_addr: "127.0.0.1:9100".parse().unwrap(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_token_is_not_permitted() {
		let config = ToolServiceConfig::default();
		assert!(!config.is_permitted("missing", "lint"));
	}

	#[test]
	fn permission_checked_per_tool() {
		let mut tokens = HashMap::new();
		tokens.insert("limited-token".to_string(), HashSet::from(["lint".to_string()]));
		let config = ToolServiceConfig { token_permissions: tokens, ..ToolServiceConfig::default() };
		assert!(config.is_permitted("limited-token", "lint"));
		assert!(!config.is_permitted("limited-token", "run_tests"));
	}
}
