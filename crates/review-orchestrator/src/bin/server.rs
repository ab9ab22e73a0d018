use std::sync::Arc;

use review_breaker::CircuitBreakerTable;
use review_orchestrator::{OrchestratorConfig, build_router};
use review_telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	init_tracing("review-orchestrator");

	let config = Arc::new(OrchestratorConfig::from_env());
	let breaker = Arc::new(CircuitBreakerTable::new(config.breaker));

	let bind_addr: std::net::SocketAddr = std::env::var("ORCHESTRATOR_BIND").ok().and_then(|s| s.parse().ok()).unwrap_or_else(|| "127.0.0.1:9000".parse().unwrap());

	let app = build_router(config, breaker);
	let listener = tokio::net::TcpListener::bind(bind_addr).await?;
	tracing::info!(addr = %bind_addr, "orchestrator listening");
	axum::serve(listener, app).await?;
	Ok(())
}
