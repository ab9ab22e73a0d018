use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Describes one tool the tool service exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
	pub name: String,
	pub description: String,
	pub input_schema: Value,
	pub output_schema: Value,
}

impl ToolDefinition {
	/// Every tool's output schema must require `ok`, `stdout`, `stderr`
	/// (spec §3).
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.name.trim().is_empty() {
			return Err(ValidationError::Empty { field: "name" });
		}
		let required = self
			.output_schema
			.get("required")
			.and_then(Value::as_array)
			.ok_or(ValidationError::MissingField("output_schema"))?;
		let present: Vec<&str> = required.iter().filter_map(Value::as_str).collect();
		for name in ["ok", "stdout", "stderr"] {
			if !present.contains(&name) {
				return Err(ValidationError::MissingField("output_schema"));
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCatalog {
	pub tools: Vec<ToolDefinition>,
}

/// Response body of `POST /call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResponse {
	pub ok: bool,
	pub stdout: String,
	pub stderr: String,
}

impl ToolCallResponse {
	pub fn ok(stdout: impl Into<String>) -> Self {
		Self { ok: true, stdout: stdout.into(), stderr: String::new() }
	}

	pub fn failed(stderr: impl Into<String>) -> Self {
		Self { ok: false, stdout: String::new(), stderr: stderr.into() }
	}
}

/// Body of `POST /call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
	pub tool: String,
	#[serde(default)]
	pub args: Value,
}
