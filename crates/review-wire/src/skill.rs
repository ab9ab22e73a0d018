use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ValidationError, validate_major_minor};

/// One advertised capability of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
	pub id: String,
	/// `MAJOR.MINOR`.
	pub version: String,
	pub description: String,
	pub input_schema: Value,
	pub output_schema: Value,
}

impl Skill {
	/// Validates structural invariants from spec §3:
	/// - `id` non-empty
	/// - `version` is `MAJOR.MINOR`
	/// - `input_schema.required` contains at least `diff` and `mcp_url`
	/// - `output_schema.required` contains `findings`
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.id.trim().is_empty() {
			return Err(ValidationError::Empty { field: "id" });
		}
		validate_major_minor(&self.version)?;
		require_all(&self.input_schema, &["diff", "mcp_url"], "input_schema")?;
		require_all(&self.output_schema, &["findings"], "output_schema")?;
		Ok(())
	}
}

/// Checks that a JSON-Schema document's top-level `required` array contains
/// every name in `names`. This inspects the schema *document*, not an
/// instance validated against it — skills advertise what they require, they
/// are not themselves data to be schema-checked.
fn require_all(schema: &Value, names: &[&str], field: &'static str) -> Result<(), ValidationError> {
	let required = schema
		.get("required")
		.and_then(Value::as_array)
		.ok_or(ValidationError::MissingField(field))?;
	let present: Vec<&str> = required.iter().filter_map(Value::as_str).collect();
	for name in names {
		if !present.contains(name) {
			return Err(ValidationError::MissingField(field));
		}
	}
	Ok(())
}
