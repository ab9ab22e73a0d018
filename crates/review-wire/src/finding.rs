use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::severity::Severity;

/// One reviewer observation — the unit of orchestrator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
	pub severity: Severity,
	pub title: String,
	pub evidence: String,
	pub recommendation: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub line: Option<u32>,
}

impl Finding {
	/// Deduplication identity: `(title, file ?? "", line ?? "")`.
	pub fn dedup_key(&self) -> (String, String, String) {
		(
			self.title.clone(),
			self.file.clone().unwrap_or_default(),
			self.line.map(|l| l.to_string()).unwrap_or_default(),
		)
	}

	/// Validates the invariants from spec §3: non-empty title, and a
	/// strictly positive line number when present.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.title.trim().is_empty() {
			return Err(ValidationError::Empty { field: "title" });
		}
		if let Some(line) = self.line
			&& line == 0
		{
			return Err(ValidationError::NotPositiveInteger { field: "line", value: 0 });
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn finding(title: &str, file: Option<&str>, line: Option<u32>) -> Finding {
		Finding {
			severity: Severity::High,
			title: title.to_string(),
			evidence: "evidence".to_string(),
			recommendation: "fix it".to_string(),
			file: file.map(str::to_string),
			line,
		}
	}

	#[test]
	fn dedup_key_uses_empty_string_defaults() {
		let f = finding("API Key", None, None);
		assert_eq!(f.dedup_key(), ("API Key".to_string(), String::new(), String::new()));
	}

	#[test]
	fn dedup_key_distinguishes_by_file_and_line() {
		let a = finding("dup", Some("a.rs"), Some(1));
		let b = finding("dup", Some("a.rs"), Some(2));
		assert_ne!(a.dedup_key(), b.dedup_key());
	}

	#[test]
	fn empty_title_is_invalid() {
		let f = finding("", None, None);
		assert!(f.validate().is_err());
	}

	#[test]
	fn zero_line_is_invalid() {
		let f = finding("x", None, Some(0));
		assert!(f.validate().is_err());
	}
}
