use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Summary statistics for one named latency series, computed once from the
/// raw samples recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyHistogram {
	pub p50_ms: u64,
	pub p95_ms: u64,
	pub count: u64,
}

impl LatencyHistogram {
	fn from_samples(samples: &[u64]) -> Self {
		let mut sorted = samples.to_vec();
		sorted.sort_unstable();
		LatencyHistogram { p50_ms: percentile(&sorted, 0.50), p95_ms: percentile(&sorted, 0.95), count: sorted.len() as u64 }
	}
}

fn percentile(sorted: &[u64], fraction: f64) -> u64 {
	if sorted.is_empty() {
		return 0;
	}
	let rank = ((sorted.len() as f64 - 1.0) * fraction).round() as usize;
	sorted[rank.min(sorted.len() - 1)]
}

/// Per-run metrics collector. Scoped to a single fan-out, never shared
/// across runs; recording is serialized behind an internal mutex since
/// many concurrent `invokeAgent` calls record into the same collector.
#[derive(Debug, Default)]
pub struct RunMetrics {
	started: Mutex<Option<Instant>>,
	agent_latencies_ms: Mutex<HashMap<String, Vec<u64>>>,
	tool_latencies_ms: Mutex<HashMap<String, Vec<u64>>>,
	total_duration_ms: Mutex<Option<u64>>,
}

impl RunMetrics {
	pub fn new() -> Self {
		let metrics = Self::default();
		*metrics.started.lock() = Some(Instant::now());
		metrics
	}

	pub fn record_agent_latency(&self, agent_name: &str, duration_ms: u64) {
		self.agent_latencies_ms.lock().entry(agent_name.to_string()).or_default().push(duration_ms);
	}

	pub fn record_tool_latency(&self, tool_name: &str, duration_ms: u64) {
		self.tool_latencies_ms.lock().entry(tool_name.to_string()).or_default().push(duration_ms);
	}

	/// Marks the fan-out complete; `total_duration_ms` reflects
	/// wall-clock elapsed since `new()`.
	pub fn finish(&self) {
		if let Some(start) = *self.started.lock() {
			*self.total_duration_ms.lock() = Some(start.elapsed().as_millis() as u64);
		}
	}

	pub fn total_duration_ms(&self) -> Option<u64> {
		*self.total_duration_ms.lock()
	}

	pub fn agent_histograms(&self) -> BTreeMap<String, LatencyHistogram> {
		self.agent_latencies_ms.lock().iter().map(|(k, v)| (k.clone(), LatencyHistogram::from_samples(v))).collect()
	}

	pub fn tool_histograms(&self) -> BTreeMap<String, LatencyHistogram> {
		self.tool_latencies_ms.lock().iter().map(|(k, v)| (k.clone(), LatencyHistogram::from_samples(v))).collect()
	}

	/// A serializable point-in-time snapshot, suitable for embedding in a
	/// `MergedReviewResult`.
	pub fn snapshot(&self, correlation_id: crate::CorrelationId) -> RunMetricsSnapshot {
		RunMetricsSnapshot {
			correlation_id: correlation_id.to_string(),
			total_duration_ms: self.total_duration_ms(),
			agent_latencies: self.agent_histograms(),
			tool_latencies: self.tool_histograms(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetricsSnapshot {
	pub correlation_id: String,
	pub total_duration_ms: Option<u64>,
	pub agent_latencies: BTreeMap<String, LatencyHistogram>,
	pub tool_latencies: BTreeMap<String, LatencyHistogram>,
}
