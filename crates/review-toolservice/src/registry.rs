use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use review_wire::{ToolCallResponse, ToolCatalog, ToolDefinition};
use serde_json::Value;

/// Executes one tool. Internal tool behavior (what `lint` actually lints)
/// is explicitly out of scope for this system (spec §1); this trait is the
/// seam a real deployment plugs concrete tool execution into, grounded in
/// the teacher's `ToolExecutor` trait (`patterns/mod.rs`).
#[async_trait]
pub trait ToolHandler: Send + Sync {
	async fn call(&self, args: Value) -> ToolCallResponse;
}

struct RegisteredTool {
	definition: ToolDefinition,
	handler: Arc<dyn ToolHandler>,
}

/// The tool service's allowlist: every tool it is willing to run, plus the
/// handler that runs it.
#[derive(Default)]
pub struct ToolRegistry {
	tools: HashMap<String, RegisteredTool>,
	order: Vec<String>,
}

impl ToolRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, definition: ToolDefinition, handler: Arc<dyn ToolHandler>) {
		let name = definition.name.clone();
		if !self.tools.contains_key(&name) {
			self.order.push(name.clone());
		}
		self.tools.insert(name, RegisteredTool { definition, handler });
	}

	pub fn exists(&self, name: &str) -> bool {
		self.tools.contains_key(name)
	}

	pub fn catalog(&self) -> ToolCatalog {
		ToolCatalog { tools: self.order.iter().filter_map(|name| self.tools.get(name)).map(|t| t.definition.clone()).collect() }
	}

	pub async fn call(&self, name: &str, args: Value) -> Option<ToolCallResponse> {
		let tool = self.tools.get(name)?;
		Some(tool.handler.call(args).await)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	struct EchoHandler;

	#[async_trait]
	impl ToolHandler for EchoHandler {
		async fn call(&self, args: Value) -> ToolCallResponse {
			ToolCallResponse::ok(args.to_string())
		}
	}

	fn lint_definition() -> ToolDefinition {
		ToolDefinition {
			name: "lint".to_string(),
			description: "runs the linter".to_string(),
			input_schema: json!({}),
			output_schema: json!({"required": ["ok", "stdout", "stderr"]}),
		}
	}

	#[tokio::test]
	async fn registered_tool_is_callable() {
		let mut registry = ToolRegistry::new();
		registry.register(lint_definition(), Arc::new(EchoHandler));
		assert!(registry.exists("lint"));
		let response = registry.call("lint", json!({"path": "."})).await.unwrap();
		assert!(response.ok);
	}

	#[tokio::test]
	async fn unknown_tool_returns_none() {
		let registry = ToolRegistry::new();
		assert!(registry.call("missing", json!({})).await.is_none());
	}

	#[test]
	fn catalog_preserves_registration_order() {
		let mut registry = ToolRegistry::new();
		registry.register(lint_definition(), Arc::new(EchoHandler));
		registry.register(
			ToolDefinition {
				name: "run_tests".to_string(),
				description: "runs tests".to_string(),
				input_schema: json!({}),
				output_schema: json!({"required": ["ok", "stdout", "stderr"]}),
			},
			Arc::new(EchoHandler),
		);
		let catalog = registry.catalog();
		let names: Vec<&str> = catalog.tools.iter().map(|t| t.name.as_str()).collect();
		assert_eq!(names, vec!["lint", "run_tests"]);
	}
}
