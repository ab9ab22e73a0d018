/// Transport-level failure classifier shared by agent invocation and tool
/// sub-invocation (spec §4.F point 5). Case-insensitive substring match
/// against the message text.
const RETRYABLE_PATTERNS: [&str; 7] =
	["timeout", "aborted", "econnrefused", "econnreset", "network", "unable to connect", "connection refused"];

pub fn is_retryable(message: &str) -> bool {
	let lower = message.to_lowercase();
	RETRYABLE_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recognizes_known_transient_messages() {
		assert!(is_retryable("Timeout"));
		assert!(is_retryable("request Aborted"));
		assert!(is_retryable("ECONNREFUSED"));
		assert!(is_retryable("ECONNRESET"));
		assert!(is_retryable("Network error"));
		assert!(is_retryable("Unable to connect"));
		assert!(is_retryable("connection refused by peer"));
	}

	#[test]
	fn rejects_non_transient_messages() {
		assert!(!is_retryable("HTTP 500"));
		assert!(!is_retryable("Invalid params"));
	}
}
