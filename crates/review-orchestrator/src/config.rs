use std::time::Duration;

use review_breaker::BreakerConfig;

/// All tunables for one orchestrator instance, built once at construction
/// (spec §9 design note) and never read from the environment at a call
/// site.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
	pub agent_timeout: Duration,
	pub tool_timeout: Duration,
	pub max_retries: u32,
	pub max_negotiation_rounds: u32,
	pub breaker: BreakerConfig,
	/// Bearer token the orchestrator presents to agents and the tool
	/// service, if any.
	pub bearer_token: Option<String>,
}

impl Default for OrchestratorConfig {
	fn default() -> Self {
		Self {
			agent_timeout: Duration::from_millis(5_000),
			tool_timeout: Duration::from_millis(3_000),
			max_retries: 1,
			max_negotiation_rounds: 2,
			breaker: BreakerConfig::default(),
			bearer_token: None,
		}
	}
}

impl OrchestratorConfig {
	/// Reads overrides from the environment once, at startup. Intentionally
	/// not called anywhere but `main` — everything downstream takes the
	/// resulting struct by value/`Arc`.
	pub fn from_env() -> Self {
		let mut config = Self::default();
		if let Ok(v) = std::env::var("ORCHESTRATOR_AGENT_TIMEOUT_MS")
			&& let Ok(ms) = v.parse()
		{
			config.agent_timeout = Duration::from_millis(ms);
		}
		if let Ok(v) = std::env::var("ORCHESTRATOR_TOOL_TIMEOUT_MS")
			&& let Ok(ms) = v.parse()
		{
			config.tool_timeout = Duration::from_millis(ms);
		}
		if let Ok(v) = std::env::var("ORCHESTRATOR_MAX_RETRIES")
			&& let Ok(n) = v.parse()
		{
			config.max_retries = n;
		}
		if let Ok(v) = std::env::var("ORCHESTRATOR_MAX_NEGOTIATION_ROUNDS")
			&& let Ok(n) = v.parse()
		{
			config.max_negotiation_rounds = n;
		}
		if let Ok(token) = std::env::var("ORCHESTRATOR_BEARER_TOKEN") {
			config.bearer_token = Some(token);
		}
		config
	}
}
