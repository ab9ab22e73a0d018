use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use review_telemetry::init_tracing;
use review_toolservice::{build_router, ToolHandler, ToolRegistry, ToolServiceConfig};
use review_wire::{ToolCallResponse, ToolDefinition};
use serde_json::{json, Value};

/// Deterministic stub: the real lint/test/audit behavior is an external
/// collaborator (spec.md §1, "the mock tool implementations"). This exists
/// only to exercise the `/call` contract end-to-end.
struct StubToolHandler {
	stdout: &'static str,
}

#[async_trait]
impl ToolHandler for StubToolHandler {
	async fn call(&self, _args: Value) -> ToolCallResponse {
		ToolCallResponse::ok(self.stdout)
	}
}

fn catalog_tools() -> Vec<(ToolDefinition, Arc<dyn ToolHandler>)> {
	vec![
		(
			ToolDefinition {
				name: "lint".to_string(),
				description: "runs the project linter".to_string(),
				input_schema: json!({"type": "object"}),
				output_schema: json!({"type": "object", "required": ["ok", "stdout", "stderr"]}),
			},
			Arc::new(StubToolHandler { stdout: "no lint issues found" }) as Arc<dyn ToolHandler>,
		),
		(
			ToolDefinition {
				name: "run_tests".to_string(),
				description: "runs the project's test suite".to_string(),
				input_schema: json!({"type": "object"}),
				output_schema: json!({"type": "object", "required": ["ok", "stdout", "stderr"]}),
			},
			Arc::new(StubToolHandler { stdout: "0 failed, 12 passed" }),
		),
		(
			ToolDefinition {
				name: "dependency_audit".to_string(),
				description: "audits dependencies for known vulnerabilities".to_string(),
				input_schema: json!({"type": "object"}),
				output_schema: json!({"type": "object", "required": ["ok", "stdout", "stderr"]}),
			},
			Arc::new(StubToolHandler { stdout: "0 vulnerabilities found" }),
		),
	]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	init_tracing("review-toolservice");

	let mut token_permissions: HashMap<String, HashSet<String>> = HashMap::new();
	token_permissions.insert("full-token".to_string(), HashSet::from(["lint".to_string(), "run_tests".to_string(), "dependency_audit".to_string()]));
	token_permissions.insert("limited-token".to_string(), HashSet::from(["lint".to_string()]));

	let config = Arc::new(ToolServiceConfig {
		auth_enabled: std::env::var("TOOLSERVICE_AUTH_DISABLED").is_err(),
		token_permissions,
		bind_addr: std::env::var("TOOLSERVICE_BIND").ok().and_then(|s| s.parse().ok()).unwrap_or_else(|| "127.0.0.1:9100".parse().unwrap()),
	});

	let mut registry = ToolRegistry::new();
	for (definition, handler) in catalog_tools() {
		registry.register(definition, handler);
	}

	let app = build_router(config.clone(), Arc::new(registry));
	let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
	tracing::info!(addr = %config.bind_addr, "tool service listening");
	axum::serve(listener, app).await?;
	Ok(())
}
