use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the process-wide structured logging subscriber.
///
/// Log level is controlled by `RUST_LOG` (defaulting to `info`); output is
/// JSON so it can be ingested by the same tooling that ingests the other
/// services in this system. Call once, at the top of `main`.
pub fn init_tracing(service_name: &'static str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true).with_current_span(true);
	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(fmt_layer)
		.try_init();
	tracing::info!(service = service_name, "tracing initialized");
}
