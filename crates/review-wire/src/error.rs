use thiserror::Error;

/// Errors raised while validating an inbound wire payload, independent of
/// the JSON-RPC error code it is eventually reported under.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("missing required field: {0}")]
	MissingField(&'static str),

	#[error("field '{field}' has the wrong type: expected {expected}")]
	WrongType { field: &'static str, expected: &'static str },

	#[error("field '{field}' is empty but must be non-empty")]
	Empty { field: &'static str },

	#[error("invalid version string '{0}': expected MAJOR.MINOR")]
	InvalidVersion(String),

	#[error("invalid URL in field '{field}': {reason}")]
	InvalidUrl { field: &'static str, reason: String },

	#[error("'{field}' must be a positive integer, got {value}")]
	NotPositiveInteger { field: &'static str, value: i64 },

	#[error("agent card endpoint '{endpoint}' is not on the same host as '{base}'")]
	EndpointHostMismatch { endpoint: String, base: String },

	#[error("unknown auth type: {0}")]
	UnknownAuthType(String),

	#[error("unknown negotiation request_type: {0}")]
	UnknownRequestType(String),
}

/// Version strings in this system are always `MAJOR.MINOR`.
pub(crate) fn validate_major_minor(value: &str) -> Result<(), ValidationError> {
	static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
	let re = PATTERN.get_or_init(|| regex::Regex::new(r"^\d+\.\d+$").unwrap());
	if re.is_match(value) {
		Ok(())
	} else {
		Err(ValidationError::InvalidVersion(value.to_string()))
	}
}
