use std::collections::HashMap;
use std::time::Instant;

use review_breaker::CircuitBreakerTable;
use review_telemetry::{CorrelationId, RunMetrics};
use review_wire::{
	AgentResponse, DiscoveredAgent, InvokeInput, InvokeParams, InvokeRequestEnvelope, JsonRpcResponseEnvelope, ToolCallRequest,
	ToolCallResponse,
};
use serde_json::Value;

use crate::config::OrchestratorConfig;
use crate::retry::is_retryable;

/// The negotiation protocol's three states (spec §9 design note). Tracked
/// explicitly, rather than left implicit in the loop's control flow, so a
/// `tracing` span always reports which phase an in-flight `invokeAgent`
/// call is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NegotiationState {
	AwaitingRoundResult,
	FetchingContext,
	Done,
}

/// Outcome of one `invokeAgent` call, successful or not. Always carries
/// enough to render a per-agent line in the final report.
#[derive(Debug, Clone)]
pub struct InvokeResult {
	pub agent_name: String,
	pub skill_id: String,
	pub findings: Vec<review_wire::Finding>,
	pub error: Option<String>,
	pub retried: bool,
	pub duration_ms: u64,
}

impl InvokeResult {
	fn success(agent_name: &str, skill_id: &str, findings: Vec<review_wire::Finding>, retried: bool, duration_ms: u64) -> Self {
		Self { agent_name: agent_name.to_string(), skill_id: skill_id.to_string(), findings, error: None, retried, duration_ms }
	}

	fn error(agent_name: &str, skill_id: &str, message: String, retried: bool, duration_ms: u64) -> Self {
		Self { agent_name: agent_name.to_string(), skill_id: skill_id.to_string(), findings: Vec::new(), error: Some(message), retried, duration_ms }
	}
}

/// Drives one agent through the full negotiation protocol (spec §4.F):
/// invoke, optionally satisfy a `NeedMoreInfo` round by calling the tool
/// service, invoke again with the accumulated context, until a
/// `ReviewResult` lands or `max_negotiation_rounds` is exhausted.
pub async fn invoke_agent(
	client: &reqwest::Client,
	agent: &DiscoveredAgent,
	skill_id: &str,
	diff: &str,
	mcp_url: &str,
	correlation_id: CorrelationId,
	config: &OrchestratorConfig,
	breaker: &CircuitBreakerTable,
	metrics: &RunMetrics,
) -> InvokeResult {
	let start = Instant::now();
	let mut additional_context: HashMap<String, Value> = HashMap::new();
	let mut retried_any = false;
	let mut state = NegotiationState::AwaitingRoundResult;

	for round in 0..config.max_negotiation_rounds {
		tracing::debug!(agent = %agent.card.name, round, ?state, "sending invoke round");
		let input = InvokeInput { diff: diff.to_string(), mcp_url: mcp_url.to_string(), additional_context: additional_context.clone() };
		let outcome = send_invoke_round(client, agent, skill_id, input, correlation_id, config, breaker).await;
		let (response, retried) = match outcome {
			Ok(pair) => pair,
			Err((message, retried)) => {
				retried_any = retried_any || retried;
				let duration_ms = start.elapsed().as_millis() as u64;
				return InvokeResult::error(&agent.card.name, skill_id, message, retried_any, duration_ms);
			},
		};
		retried_any = retried_any || retried;

		match response {
			AgentResponse::ReviewResult { findings } => {
				state = NegotiationState::Done;
				let duration_ms = start.elapsed().as_millis() as u64;
				metrics.record_agent_latency(&agent.card.name, duration_ms);
				tracing::debug!(agent = %agent.card.name, ?state, "review result received");
				return InvokeResult::success(&agent.card.name, skill_id, findings, retried_any, duration_ms);
			},
			AgentResponse::NeedMoreInfo { request_type, request_params, .. } => {
				let Some(tool) = request_params.tool.clone() else {
					let duration_ms = start.elapsed().as_millis() as u64;
					let message = format!("Agent requested {} but tool call failed", request_type);
					return InvokeResult::error(&agent.card.name, skill_id, message, retried_any, duration_ms);
				};
				if round + 1 >= config.max_negotiation_rounds {
					break;
				}
				state = NegotiationState::FetchingContext;
				let args = request_params.args.clone().unwrap_or(Value::Null);
				let tool_outcome = call_tool_with_retries(client, mcp_url, &tool, args, correlation_id, config, metrics).await;
				match tool_outcome {
					Ok((response, retried)) if response.ok => {
						retried_any = retried_any || retried;
						breaker.record_success(&agent.card.endpoint);
						additional_context.insert(request_type.as_str().to_string(), Value::String(response.stdout));
						state = NegotiationState::AwaitingRoundResult;
					},
					Ok((response, retried)) => {
						retried_any = retried_any || retried;
						breaker.record_success(&agent.card.endpoint);
						let duration_ms = start.elapsed().as_millis() as u64;
						let message = tool_failure_message(request_type, &tool, &response.stderr);
						return InvokeResult::error(&agent.card.name, skill_id, message, retried_any, duration_ms);
					},
					Err((transport_message, retried)) => {
						retried_any = retried_any || retried;
						breaker.record_success(&agent.card.endpoint);
						let duration_ms = start.elapsed().as_millis() as u64;
						let message = tool_failure_message(request_type, &tool, &transport_message);
						return InvokeResult::error(&agent.card.name, skill_id, message, retried_any, duration_ms);
					},
				}
			},
		}
	}

	breaker.record_failure(&agent.card.endpoint);
	let duration_ms = start.elapsed().as_millis() as u64;
	let message = format!("Max negotiation rounds ({}) exceeded", config.max_negotiation_rounds);
	InvokeResult::error(&agent.card.name, skill_id, message, retried_any, duration_ms)
}

fn tool_failure_message(request_type: review_wire::NegotiationRequestType, tool: &str, detail: &str) -> String {
	if detail.trim().is_empty() {
		format!("Agent requested {} via {} but tool call failed", request_type, tool)
	} else {
		format!("Agent requested {} via {} but tool call failed: {}", request_type, tool, detail)
	}
}

/// One negotiation round: up to `1 + max_retries` attempts against the
/// agent's endpoint, consulting the circuit breaker before every attempt.
/// Response-level JSON-RPC errors are never retried; transport failures are
/// retried only while [`is_retryable`] holds.
async fn send_invoke_round(
	client: &reqwest::Client,
	agent: &DiscoveredAgent,
	skill_id: &str,
	input: InvokeInput,
	correlation_id: CorrelationId,
	config: &OrchestratorConfig,
	breaker: &CircuitBreakerTable,
) -> Result<(AgentResponse, bool), (String, bool)> {
	let max_attempts = 1 + config.max_retries;
	let mut retried = false;

	for attempt in 0..max_attempts {
		if !breaker.is_available(&agent.card.endpoint) {
			return Err((format!("Circuit breaker open for {}", agent.card.name), retried));
		}

		let params = InvokeParams { skill: skill_id.to_string(), input: input.clone() };
		if let Err(error) = params.validate() {
			return Err((error.to_string(), retried));
		}
		let envelope = InvokeRequestEnvelope {
			jsonrpc: "2.0".to_string(),
			id: correlation_id.to_string(),
			method: "invoke".to_string(),
			params: serde_json::to_value(&params).expect("InvokeParams always serializes"),
		};

		let mut request = client.post(&agent.card.endpoint).header("X-Correlation-ID", correlation_id.to_string());
		if let Some(token) = &config.bearer_token {
			request = request.bearer_auth(token);
		}
		let send = request.json(&envelope).send();

		let last_attempt = attempt + 1 == max_attempts;
		match tokio::time::timeout(config.agent_timeout, send).await {
			Err(_elapsed) => {
				if !last_attempt {
					retried = true;
					continue;
				}
				breaker.record_failure(&agent.card.endpoint);
				return Err((format!("Timeout after {}ms", config.agent_timeout.as_millis()), retried));
			},
			Ok(Err(transport_error)) => {
				let message = transport_error.to_string();
				if is_retryable(&message) && !last_attempt {
					retried = true;
					continue;
				}
				breaker.record_failure(&agent.card.endpoint);
				return Err((message, retried));
			},
			Ok(Ok(response)) => {
				let status = response.status();
				if !status.is_success() {
					breaker.record_failure(&agent.card.endpoint);
					return Err((format!("HTTP {}", status.as_u16()), retried));
				}
				let envelope: JsonRpcResponseEnvelope = match response.json().await {
					Ok(envelope) => envelope,
					Err(error) => {
						breaker.record_failure(&agent.card.endpoint);
						return Err((error.to_string(), retried));
					},
				};
				if let Some(error) = envelope.error {
					breaker.record_failure(&agent.card.endpoint);
					return Err((error.message, retried));
				}
				let Some(result) = envelope.result else {
					breaker.record_failure(&agent.card.endpoint);
					return Err(("JSON-RPC response carried neither result nor error".to_string(), retried));
				};
				let parsed: AgentResponse = match serde_json::from_value(result) {
					Ok(parsed) => parsed,
					Err(error) => {
						breaker.record_failure(&agent.card.endpoint);
						return Err((error.to_string(), retried));
					},
				};
				breaker.record_success(&agent.card.endpoint);
				return Ok((parsed, retried));
			},
		}
	}

	unreachable!("loop always returns on its last attempt")
}

/// Tool sub-invocation during negotiation: identical timeout/retry envelope
/// as agent calls but against `TOOL_TIMEOUT_MS`, and deliberately bypasses
/// the agent's circuit breaker — a tool-call transport failure is not the
/// agent's fault.
async fn call_tool_with_retries(
	client: &reqwest::Client,
	mcp_url: &str,
	tool: &str,
	args: Value,
	correlation_id: CorrelationId,
	config: &OrchestratorConfig,
	metrics: &RunMetrics,
) -> Result<(ToolCallResponse, bool), (String, bool)> {
	let max_attempts = 1 + config.max_retries;
	let mut retried = false;
	let start = Instant::now();

	for attempt in 0..max_attempts {
		let body = ToolCallRequest { tool: tool.to_string(), args: args.clone() };
		let mut request = client.post(format!("{}/call", mcp_url.trim_end_matches('/'))).header("X-Correlation-ID", correlation_id.to_string());
		if let Some(token) = &config.bearer_token {
			request = request.bearer_auth(token);
		}
		let send = request.json(&body).send();
		let last_attempt = attempt + 1 == max_attempts;

		match tokio::time::timeout(config.tool_timeout, send).await {
			Err(_elapsed) => {
				if !last_attempt {
					retried = true;
					continue;
				}
				return Err((format!("Timeout after {}ms", config.tool_timeout.as_millis()), retried));
			},
			Ok(Err(transport_error)) => {
				let message = transport_error.to_string();
				if is_retryable(&message) && !last_attempt {
					retried = true;
					continue;
				}
				return Err((message, retried));
			},
			Ok(Ok(response)) => {
				let status = response.status();
				if !status.is_success() {
					return Err((format!("HTTP {}", status.as_u16()), retried));
				}
				let parsed: ToolCallResponse = match response.json().await {
					Ok(parsed) => parsed,
					Err(error) => return Err((error.to_string(), retried)),
				};
				metrics.record_tool_latency(tool, start.elapsed().as_millis() as u64);
				return Ok((parsed, retried));
			},
		}
	}

	unreachable!("loop always returns on its last attempt")
}

#[cfg(test)]
mod tests {
	use review_breaker::BreakerConfig;
	use review_wire::{AgentCard, AuthSpec, AuthType, Skill};
	use serde_json::json;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	fn agent_for(server: &MockServer) -> DiscoveredAgent {
		let endpoint = format!("{}/rpc", server.uri());
		DiscoveredAgent {
			base_url: server.uri(),
			card: AgentCard {
				name: "security-agent".to_string(),
				version: "0.1.0".to_string(),
				protocol_version: "1.0".to_string(),
				endpoint,
				skills: vec![Skill {
					id: "review.security".to_string(),
					version: "1.0".to_string(),
					description: "finds secrets".to_string(),
					input_schema: json!({"required": ["diff", "mcp_url"]}),
					output_schema: json!({"required": ["findings"]}),
				}],
				auth: AuthSpec { auth_type: AuthType::None },
			},
		}
	}

	#[tokio::test]
	async fn review_result_on_first_round_succeeds() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/rpc"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": "1", "result": {"findings": []}})))
			.mount(&server)
			.await;

		let agent = agent_for(&server);
		let client = reqwest::Client::new();
		let breaker = CircuitBreakerTable::new(BreakerConfig::default());
		let metrics = RunMetrics::new();
		let result =
			invoke_agent(&client, &agent, "review.security", "+x", "http://127.0.0.1:9100", CorrelationId::new(), &OrchestratorConfig::default(), &breaker, &metrics)
				.await;
		assert!(result.error.is_none());
	}

	#[tokio::test]
	async fn negotiation_round_fetches_context_then_succeeds() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/call"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "stdout": "0 failed", "stderr": ""})))
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/rpc"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": "1",
				"result": {"need_more_info": true, "request_type": "test_output", "request_params": {"tool": "run_tests"}},
			})))
			.up_to_n_times(1)
			.with_priority(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/rpc"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": "2", "result": {"findings": []}})))
			.with_priority(2)
			.mount(&server)
			.await;

		let agent = agent_for(&server);
		let client = reqwest::Client::new();
		let breaker = CircuitBreakerTable::new(BreakerConfig::default());
		let metrics = RunMetrics::new();
		let mcp_url = server.uri();
		let result = invoke_agent(&client, &agent, "review.security", "+x", &mcp_url, CorrelationId::new(), &OrchestratorConfig::default(), &breaker, &metrics).await;
		assert!(result.error.is_none());
	}

	#[tokio::test]
	async fn exhausting_negotiation_rounds_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/call"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "stdout": "x", "stderr": ""})))
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/rpc"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": "1",
				"result": {"need_more_info": true, "request_type": "test_output", "request_params": {"tool": "run_tests"}},
			})))
			.mount(&server)
			.await;

		let agent = agent_for(&server);
		let client = reqwest::Client::new();
		let breaker = CircuitBreakerTable::new(BreakerConfig::default());
		let metrics = RunMetrics::new();
		let mcp_url = server.uri();
		let result = invoke_agent(&client, &agent, "review.security", "+x", &mcp_url, CorrelationId::new(), &OrchestratorConfig::default(), &breaker, &metrics).await;
		assert_eq!(result.error.as_deref(), Some("Max negotiation rounds (2) exceeded"));
	}

	#[tokio::test]
	async fn unreachable_agent_reports_transport_error() {
		let agent = DiscoveredAgent {
			base_url: "http://127.0.0.1:1".to_string(),
			card: AgentCard {
				name: "unreachable".to_string(),
				version: "0.1.0".to_string(),
				protocol_version: "1.0".to_string(),
				endpoint: "http://127.0.0.1:1/rpc".to_string(),
				skills: vec![Skill {
					id: "review.security".to_string(),
					version: "1.0".to_string(),
					description: "finds secrets".to_string(),
					input_schema: json!({"required": ["diff", "mcp_url"]}),
					output_schema: json!({"required": ["findings"]}),
				}],
				auth: AuthSpec { auth_type: AuthType::None },
			},
		};
		let client = reqwest::Client::new();
		let breaker = CircuitBreakerTable::new(BreakerConfig::default());
		let metrics = RunMetrics::new();
		let result =
			invoke_agent(&client, &agent, "review.security", "+x", "http://127.0.0.1:9100", CorrelationId::new(), &OrchestratorConfig::default(), &breaker, &metrics)
				.await;
		assert!(result.error.is_some());
		assert_eq!(breaker.status(&agent.card.endpoint).failures, 1);
	}
}
