use std::collections::HashMap;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::finding::Finding;

/// A JSON-RPC 2.0 request envelope. Only the `invoke` method is defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequestEnvelope {
	pub jsonrpc: String,
	pub id: String,
	pub method: String,
	pub params: Value,
}

impl InvokeRequestEnvelope {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.jsonrpc != "2.0" {
			return Err(ValidationError::WrongType { field: "jsonrpc", expected: "\"2.0\"" });
		}
		if self.id.trim().is_empty() {
			return Err(ValidationError::Empty { field: "id" });
		}
		if self.method.trim().is_empty() {
			return Err(ValidationError::Empty { field: "method" });
		}
		Ok(())
	}
}

/// Standard JSON-RPC error codes this system produces or consumes, per
/// spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
	ParseError,
	InvalidRequest,
	MethodNotFound,
	InvalidParams,
	InternalError,
	Unauthorized,
	Forbidden,
}

impl JsonRpcErrorCode {
	pub fn code(self) -> i64 {
		match self {
			JsonRpcErrorCode::ParseError => -32700,
			JsonRpcErrorCode::InvalidRequest => -32600,
			JsonRpcErrorCode::MethodNotFound => -32601,
			JsonRpcErrorCode::InvalidParams => -32602,
			JsonRpcErrorCode::InternalError => -32603,
			JsonRpcErrorCode::Unauthorized => -32001,
			JsonRpcErrorCode::Forbidden => -32003,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
	pub code: i64,
	pub message: String,
}

impl JsonRpcError {
	pub fn new(code: JsonRpcErrorCode, message: impl Into<String>) -> Self {
		Self { code: code.code(), message: message.into() }
	}
}

/// JSON-RPC response envelope: either `result` or `error`, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponseEnvelope {
	pub jsonrpc: String,
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<JsonRpcError>,
}

impl JsonRpcResponseEnvelope {
	pub fn success(id: impl Into<String>, result: Value) -> Self {
		Self { jsonrpc: "2.0".to_string(), id: id.into(), result: Some(result), error: None }
	}

	pub fn failure(id: impl Into<String>, error: JsonRpcError) -> Self {
		Self { jsonrpc: "2.0".to_string(), id: id.into(), result: None, error: Some(error) }
	}
}

/// `params` of an `invoke` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeParams {
	pub skill: String,
	pub input: InvokeInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeInput {
	pub diff: String,
	pub mcp_url: String,
	#[serde(default)]
	pub additional_context: HashMap<String, Value>,
}

impl InvokeParams {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.skill.trim().is_empty() {
			return Err(ValidationError::Empty { field: "skill" });
		}
		url::Url::parse(&self.input.mcp_url)
			.map_err(|e| ValidationError::InvalidUrl { field: "mcp_url", reason: e.to_string() })?;
		Ok(())
	}
}

/// The kind of extra context an agent may request during negotiation. The
/// source's `additional_context` schema allows arbitrary keys (spec §9), so
/// this is not a closed enum: any `request_type` string an agent sends is
/// preserved verbatim via `Other`, rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationRequestType {
	FileContents,
	TestOutput,
	GitBlame,
	Custom,
	Other(String),
}

impl NegotiationRequestType {
	/// The wire-form key used as both the JSON `request_type` value and the
	/// `additional_context` map key (spec §4.F, §6).
	pub fn as_str(&self) -> &str {
		match self {
			NegotiationRequestType::FileContents => "file_contents",
			NegotiationRequestType::TestOutput => "test_output",
			NegotiationRequestType::GitBlame => "git_blame",
			NegotiationRequestType::Custom => "custom",
			NegotiationRequestType::Other(value) => value,
		}
	}
}

impl std::fmt::Display for NegotiationRequestType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for NegotiationRequestType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for NegotiationRequestType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		Ok(match raw.as_str() {
			"file_contents" => NegotiationRequestType::FileContents,
			"test_output" => NegotiationRequestType::TestOutput,
			"git_blame" => NegotiationRequestType::GitBlame,
			"custom" => NegotiationRequestType::Custom,
			_ => NegotiationRequestType::Other(raw),
		})
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationRequestParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub args: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// Tagged union of an agent's reply to `invoke`. The discriminator is the
/// presence of `need_more_info: true`, not an adjacent tag — this matches
/// the wire shape in spec §6.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AgentResponse {
	NeedMoreInfo {
		need_more_info: bool,
		request_type: NegotiationRequestType,
		request_params: NegotiationRequestParams,
	},
	ReviewResult {
		findings: Vec<Finding>,
	},
}

impl<'de> Deserialize<'de> for AgentResponse {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		let needs_more = value.get("need_more_info").and_then(Value::as_bool).unwrap_or(false);
		if needs_more {
			let request_type: NegotiationRequestType = value
				.get("request_type")
				.cloned()
				.map(serde_json::from_value)
				.transpose()
				.map_err(DeError::custom)?
				.ok_or_else(|| DeError::missing_field("request_type"))?;
			let request_params: NegotiationRequestParams = value
				.get("request_params")
				.cloned()
				.map(serde_json::from_value)
				.transpose()
				.map_err(DeError::custom)?
				.unwrap_or(NegotiationRequestParams { tool: None, args: None, description: None });
			Ok(AgentResponse::NeedMoreInfo { need_more_info: true, request_type, request_params })
		} else {
			let findings: Vec<Finding> = value
				.get("findings")
				.cloned()
				.map(serde_json::from_value)
				.transpose()
				.map_err(DeError::custom)?
				.ok_or_else(|| DeError::missing_field("findings"))?;
			Ok(AgentResponse::ReviewResult { findings })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn review_result_round_trips() {
		let value = json!({"findings": []});
		let parsed: AgentResponse = serde_json::from_value(value).unwrap();
		assert!(matches!(parsed, AgentResponse::ReviewResult { findings } if findings.is_empty()));
	}

	#[test]
	fn need_more_info_discriminates_on_true_flag() {
		let value = json!({
			"need_more_info": true,
			"request_type": "test_output",
			"request_params": {"tool": "run_tests"}
		});
		let parsed: AgentResponse = serde_json::from_value(value).unwrap();
		match parsed {
			AgentResponse::NeedMoreInfo { request_type, request_params, .. } => {
				assert_eq!(request_type, NegotiationRequestType::TestOutput);
				assert_eq!(request_params.tool.as_deref(), Some("run_tests"));
			},
			_ => panic!("expected NeedMoreInfo"),
		}
	}

	#[test]
	fn unrecognized_request_type_is_preserved_as_other() {
		let value = json!({
			"need_more_info": true,
			"request_type": "lint_results",
			"request_params": {"tool": "lint"}
		});
		let parsed: AgentResponse = serde_json::from_value(value).unwrap();
		match parsed {
			AgentResponse::NeedMoreInfo { request_type, .. } => {
				assert_eq!(request_type.as_str(), "lint_results");
				assert_eq!(request_type, NegotiationRequestType::Other("lint_results".to_string()));
			},
			_ => panic!("expected NeedMoreInfo"),
		}
	}

	#[test]
	fn missing_findings_and_missing_flag_is_an_error() {
		let value = json!({});
		let parsed: Result<AgentResponse, _> = serde_json::from_value(value);
		assert!(parsed.is_err());
	}

	#[test]
	fn invoke_params_requires_valid_mcp_url() {
		let params = InvokeParams {
			skill: "review.security".to_string(),
			input: InvokeInput { diff: "+x".to_string(), mcp_url: "not a url".to_string(), additional_context: HashMap::new() },
		};
		assert!(params.validate().is_err());
	}
}
