use std::time::Duration;

use futures::future::join_all;
use review_wire::{AgentCard, DiscoveredAgent, is_protocol_compatible};

const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";
const DISCOVERY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Fetches `<base>/.well-known/agent-card.json` from every candidate base
/// URL in parallel, keeping only cards that are well-formed, served from
/// their own host, and protocol-compatible (spec §4.E). Input order of
/// surviving entries is preserved.
pub async fn discover_agents(client: &reqwest::Client, base_urls: &[String]) -> Vec<DiscoveredAgent> {
	let fetches = base_urls.iter().map(|base_url| fetch_one(client, base_url));
	join_all(fetches).await.into_iter().flatten().collect()
}

async fn fetch_one(client: &reqwest::Client, base_url: &str) -> Option<DiscoveredAgent> {
	let url = format!("{}{}", base_url.trim_end_matches('/'), AGENT_CARD_PATH);
	let response = match tokio::time::timeout(DISCOVERY_TIMEOUT, client.get(&url).send()).await {
		Ok(Ok(response)) if response.status().is_success() => response,
		Ok(Ok(response)) => {
			tracing::debug!(base_url, status = %response.status(), "agent card fetch rejected: non-2xx");
			return None;
		},
		Ok(Err(error)) => {
			tracing::debug!(base_url, %error, "agent card fetch rejected: transport error");
			return None;
		},
		Err(_) => {
			tracing::debug!(base_url, "agent card fetch rejected: timed out");
			return None;
		},
	};
	let card: AgentCard = match response.json().await {
		Ok(card) => card,
		Err(error) => {
			tracing::debug!(base_url, %error, "agent card fetch rejected: malformed json");
			return None;
		},
	};
	if let Err(error) = card.validate() {
		tracing::debug!(base_url, %error, "agent card fetch rejected: schema validation failed");
		return None;
	}
	if let Err(error) = card.endpoint_matches_host(base_url) {
		tracing::debug!(base_url, %error, "agent card fetch rejected: endpoint host mismatch");
		return None;
	}
	if !is_protocol_compatible(&card.protocol_version) {
		tracing::debug!(base_url, protocol_version = %card.protocol_version, "agent card fetch rejected: incompatible protocol");
		return None;
	}
	Some(DiscoveredAgent { base_url: base_url.to_string(), card })
}
