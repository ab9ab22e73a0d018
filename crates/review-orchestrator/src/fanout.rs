use std::sync::Arc;

use futures::future::join_all;
use review_breaker::CircuitBreakerTable;
use review_telemetry::{CorrelationId, RunMetrics};
use review_wire::DiscoveredAgent;

use crate::config::OrchestratorConfig;
use crate::invoker::{InvokeResult, invoke_agent};

/// Fans a diff out to every discovered agent concurrently, one
/// `invoke_agent` call per agent, and waits for all of them (spec §4.G —
/// `invokeAllAgentsWithMetrics`). A single slow or failing agent never
/// blocks the others; each carries its own outcome in the returned vector.
pub async fn invoke_all_agents(
	client: &reqwest::Client,
	agents: &[DiscoveredAgent],
	diff: &str,
	mcp_url: &str,
	correlation_id: CorrelationId,
	config: &OrchestratorConfig,
	breaker: Arc<CircuitBreakerTable>,
	metrics: Arc<RunMetrics>,
) -> Vec<InvokeResult> {
	let mut calls = Vec::new();
	for agent in agents {
		for skill in &agent.card.skills {
			let breaker = Arc::clone(&breaker);
			let metrics = Arc::clone(&metrics);
			calls.push(async move { invoke_agent(client, agent, &skill.id, diff, mcp_url, correlation_id, config, &breaker, &metrics).await });
		}
	}
	join_all(calls).await
}
