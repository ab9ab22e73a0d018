use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ValidationError, validate_major_minor};
use crate::skill::Skill;

/// Authentication mode an agent requires for its RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
	None,
	Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSpec {
	#[serde(rename = "type")]
	pub auth_type: AuthType,
}

/// Self-description returned at `/.well-known/agent-card.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
	pub name: String,
	pub version: String,
	pub protocol_version: String,
	pub endpoint: String,
	pub skills: Vec<Skill>,
	pub auth: AuthSpec,
}

impl AgentCard {
	/// Validates the shape requirements from spec §3/§4.A, *excluding*
	/// protocol compatibility (that is a discovery-time filter, not a
	/// structural validity check — an incompatible card is still
	/// well-formed).
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.name.trim().is_empty() {
			return Err(ValidationError::Empty { field: "name" });
		}
		validate_major_minor(&self.protocol_version)?;
		Url::parse(&self.endpoint).map_err(|e| ValidationError::InvalidUrl {
			field: "endpoint",
			reason: e.to_string(),
		})?;
		if self.skills.is_empty() {
			return Err(ValidationError::Empty { field: "skills" });
		}
		for skill in &self.skills {
			skill.validate()?;
		}
		Ok(())
	}

	/// Invariant: `endpoint` must point at the same host that served the
	/// card (`base_url`).
	pub fn endpoint_matches_host(&self, base_url: &str) -> Result<(), ValidationError> {
		let endpoint = Url::parse(&self.endpoint).map_err(|e| ValidationError::InvalidUrl {
			field: "endpoint",
			reason: e.to_string(),
		})?;
		let base = Url::parse(base_url).map_err(|e| ValidationError::InvalidUrl { field: "endpoint", reason: e.to_string() })?;
		if endpoint.host_str() != base.host_str() {
			return Err(ValidationError::EndpointHostMismatch {
				endpoint: self.endpoint.clone(),
				base: base_url.to_string(),
			});
		}
		Ok(())
	}
}

/// An `AgentCard` paired with the base URL it was discovered at, having
/// already passed discovery's filters. Lives only for the duration of one
/// run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredAgent {
	pub base_url: String,
	pub card: AgentCard,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn card(endpoint: &str) -> AgentCard {
		AgentCard {
			name: "security-agent".to_string(),
			version: "0.1.0".to_string(),
			protocol_version: "1.0".to_string(),
			endpoint: endpoint.to_string(),
			skills: vec![Skill {
				id: "review.security".to_string(),
				version: "1.0".to_string(),
				description: "finds secrets".to_string(),
				input_schema: json!({"required": ["diff", "mcp_url"]}),
				output_schema: json!({"required": ["findings"]}),
			}],
			auth: AuthSpec { auth_type: AuthType::None },
		}
	}

	#[test]
	fn valid_card_passes() {
		assert!(card("http://127.0.0.1:9001/rpc").validate().is_ok());
	}

	#[test]
	fn empty_skills_rejected() {
		let mut c = card("http://127.0.0.1:9001/rpc");
		c.skills.clear();
		assert!(c.validate().is_err());
	}

	#[test]
	fn host_mismatch_detected() {
		let c = card("http://example.com/rpc");
		assert!(c.endpoint_matches_host("http://127.0.0.1:9001").is_err());
	}

	#[test]
	fn host_match_accepted() {
		let c = card("http://127.0.0.1:9001/rpc");
		assert!(c.endpoint_matches_host("http://127.0.0.1:9001").is_ok());
	}
}
