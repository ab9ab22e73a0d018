use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A run-scoped identifier propagated as `X-Correlation-ID` across every
/// hop of a review (discovery, agent invoke, tool call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	pub fn parse(s: &str) -> Option<Self> {
		Uuid::parse_str(s).ok().map(Self)
	}
}

impl Default for CorrelationId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for CorrelationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<CorrelationId> for String {
	fn from(id: CorrelationId) -> Self {
		id.to_string()
	}
}
