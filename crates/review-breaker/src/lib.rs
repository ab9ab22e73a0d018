//! Per-endpoint circuit breaker, shared across all concurrent invocations
//! in one process.
//!
//! The breaker table is never exposed as a free global: callers construct
//! a [`CircuitBreakerTable`], wrap it in an `Arc`, and inject it wherever a
//! component needs to consult or update breaker state.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// `closed < half_open < open` is not a meaningful ordering; the variants
/// are compared by equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
	Closed,
	Open,
	HalfOpen,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitStatus {
	pub state: CircuitState,
	pub failures: u32,
	pub last_failure: Option<SystemTime>,
}

impl Default for CircuitStatus {
	fn default() -> Self {
		Self { state: CircuitState::Closed, failures: 0, last_failure: None }
	}
}

/// `failureThreshold` / `cooldownMs` from spec §4.C.
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
	pub failure_threshold: u32,
	pub cooldown: Duration,
}

impl Default for BreakerConfig {
	fn default() -> Self {
		Self { failure_threshold: 3, cooldown: Duration::from_millis(30_000) }
	}
}

/// Process-wide per-endpoint breaker state, safe under concurrent access.
pub struct CircuitBreakerTable {
	config: BreakerConfig,
	states: Mutex<HashMap<String, CircuitStatus>>,
}

impl CircuitBreakerTable {
	pub fn new(config: BreakerConfig) -> Self {
		Self { config, states: Mutex::new(HashMap::new()) }
	}

	/// `isAvailable` from spec §4.C: transitions `open -> half_open` after
	/// the cooldown elapses, as a side effect of the check.
	pub fn is_available(&self, endpoint: &str) -> bool {
		let mut states = self.states.lock();
		let status = states.entry(endpoint.to_string()).or_default();
		match status.state {
			CircuitState::Closed | CircuitState::HalfOpen => true,
			CircuitState::Open => {
				let elapsed = status.last_failure.and_then(|t| t.elapsed().ok()).unwrap_or(Duration::ZERO);
				if elapsed >= self.config.cooldown {
					status.state = CircuitState::HalfOpen;
					tracing::debug!(endpoint, "circuit breaker entering half_open probe");
					true
				} else {
					false
				}
			},
		}
	}

	pub fn record_success(&self, endpoint: &str) {
		let mut states = self.states.lock();
		let status = states.entry(endpoint.to_string()).or_default();
		status.state = CircuitState::Closed;
		status.failures = 0;
	}

	pub fn record_failure(&self, endpoint: &str) {
		let mut states = self.states.lock();
		let status = states.entry(endpoint.to_string()).or_default();
		status.failures += 1;
		status.last_failure = Some(SystemTime::now());
		if status.state == CircuitState::HalfOpen || status.failures >= self.config.failure_threshold {
			if status.state != CircuitState::Open {
				tracing::warn!(endpoint, failures = status.failures, "circuit breaker opened");
			}
			status.state = CircuitState::Open;
		}
	}

	pub fn status(&self, endpoint: &str) -> CircuitStatus {
		self.states.lock().get(endpoint).copied().unwrap_or_default()
	}

	/// Test/ops hook: force an endpoint back to its initial state.
	pub fn reset(&self, endpoint: &str) {
		self.states.lock().remove(endpoint);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table_with(threshold: u32, cooldown_ms: u64) -> CircuitBreakerTable {
		CircuitBreakerTable::new(BreakerConfig { failure_threshold: threshold, cooldown: Duration::from_millis(cooldown_ms) })
	}

	#[test]
	fn starts_closed_and_available() {
		let table = table_with(3, 30_000);
		assert!(table.is_available("http://a"));
		assert_eq!(table.status("http://a").state, CircuitState::Closed);
	}

	#[test]
	fn opens_after_threshold_consecutive_failures() {
		let table = table_with(3, 30_000);
		table.record_failure("http://a");
		table.record_failure("http://a");
		assert_eq!(table.status("http://a").state, CircuitState::Closed);
		table.record_failure("http://a");
		assert_eq!(table.status("http://a").state, CircuitState::Open);
		assert!(!table.is_available("http://a"));
	}

	#[test]
	fn success_resets_failures_and_closes() {
		let table = table_with(2, 30_000);
		table.record_failure("http://a");
		table.record_success("http://a");
		let status = table.status("http://a");
		assert_eq!(status.state, CircuitState::Closed);
		assert_eq!(status.failures, 0);
	}

	#[test]
	fn half_open_probe_allowed_after_cooldown() {
		let table = table_with(1, 1);
		table.record_failure("http://a");
		assert_eq!(table.status("http://a").state, CircuitState::Open);
		std::thread::sleep(Duration::from_millis(5));
		assert!(table.is_available("http://a"));
		assert_eq!(table.status("http://a").state, CircuitState::HalfOpen);
	}

	#[test]
	fn half_open_failure_reopens() {
		let table = table_with(1, 1);
		table.record_failure("http://a");
		std::thread::sleep(Duration::from_millis(5));
		assert!(table.is_available("http://a"));
		table.record_failure("http://a");
		assert_eq!(table.status("http://a").state, CircuitState::Open);
	}

	#[test]
	fn half_open_success_closes() {
		let table = table_with(1, 1);
		table.record_failure("http://a");
		std::thread::sleep(Duration::from_millis(5));
		assert!(table.is_available("http://a"));
		table.record_success("http://a");
		assert_eq!(table.status("http://a").state, CircuitState::Closed);
	}

	#[test]
	fn endpoints_are_independent() {
		let table = table_with(1, 30_000);
		table.record_failure("http://a");
		assert_eq!(table.status("http://a").state, CircuitState::Open);
		assert_eq!(table.status("http://b").state, CircuitState::Closed);
	}
}
