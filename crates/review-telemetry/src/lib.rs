//! Correlation IDs, per-run latency histograms, and the process-wide
//! tracing subscriber used by every review-orchestrator binary.

mod correlation;
mod logging;
mod metrics;

pub use correlation::CorrelationId;
pub use logging::init_tracing;
pub use metrics::{LatencyHistogram, RunMetrics, RunMetricsSnapshot};
