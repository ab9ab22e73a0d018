use serde::{Deserialize, Serialize};

/// Ordered finding severity. `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Low,
	Medium,
	High,
	Critical,
}

impl Severity {
	/// All severities, from lowest to highest rank.
	pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

	/// Integer rank used for deterministic sorting; higher is more severe.
	pub fn rank(self) -> u8 {
		match self {
			Severity::Low => 0,
			Severity::Medium => 1,
			Severity::High => 2,
			Severity::Critical => 3,
		}
	}

	/// Lowercase wire name, e.g. for report rendering.
	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Low => "low",
			Severity::Medium => "medium",
			Severity::High => "high",
			Severity::Critical => "critical",
		}
	}
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
