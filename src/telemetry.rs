use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing; `RUST_LOG` overrides the default filter.
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stream_gateway=debug,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("📊 Telemetry initialized");
}
