use review_wire::{AuthSpec, AuthType};

/// An agent process's self-description inputs, built once at startup.
#[derive(Debug, Clone)]
pub struct AgentSdkConfig {
	pub name: String,
	pub version: String,
	pub protocol_version: String,
	/// Absolute URL of this agent's `/rpc` endpoint, on the same host the
	/// agent card is served from (spec §3 invariant).
	pub endpoint: String,
	pub auth: AuthSpec,
}

impl AgentSdkConfig {
	pub fn none_auth(name: impl Into<String>, version: impl Into<String>, endpoint: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			version: version.into(),
			protocol_version: review_wire::SUPPORTED_PROTOCOL_VERSION.to_string(),
			endpoint: endpoint.into(),
			auth: AuthSpec { auth_type: AuthType::None },
		}
	}
}
