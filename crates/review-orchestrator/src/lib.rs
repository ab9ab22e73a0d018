//! Discovers review agents over HTTP, fans a diff out to all of them
//! concurrently, and merges their findings into a deterministic report.

mod config;
mod discovery;
mod error;
mod fanout;
mod invoker;
mod merge;
mod report;
mod retry;
mod server;

pub use config::OrchestratorConfig;
pub use discovery::discover_agents;
pub use fanout::invoke_all_agents;
pub use invoker::{InvokeResult, invoke_agent};
pub use merge::{AgentRun, MergedReviewResult, merge};
pub use report::{to_json, to_text};
pub use server::build_router;

use std::sync::Arc;

use review_breaker::CircuitBreakerTable;
use review_telemetry::{CorrelationId, RunMetrics};

/// Runs one full review: discover agents, fan a diff out to every one of
/// them, merge the findings. This is the orchestrator's single public
/// entrypoint — the HTTP server and any future caller both go through it.
pub async fn run_review(
	client: &reqwest::Client,
	base_urls: &[String],
	diff: &str,
	mcp_url: &str,
	config: &OrchestratorConfig,
	breaker: Arc<CircuitBreakerTable>,
) -> MergedReviewResult {
	let correlation_id = CorrelationId::new();
	let metrics = Arc::new(RunMetrics::new());

	let agents = discover_agents(client, base_urls).await;
	let results = invoke_all_agents(client, &agents, diff, mcp_url, correlation_id, config, Arc::clone(&breaker), Arc::clone(&metrics)).await;
	metrics.finish();

	merge(&results, metrics.snapshot(correlation_id))
}
