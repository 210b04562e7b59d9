use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::web::AppState;

mod config;
mod registry;
mod telemetry;
mod types;
mod upstream;
mod web;

#[cfg(test)]
mod test_fixtures;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize telemetry
    telemetry::init_telemetry();

    // Load configuration
    let config = AppConfig::load("config.json")?;
    info!("⚙️ Configuration loaded: {:?}", config);
    info!("🔗 Forwarding to backend at {}", config.backend_base());

    let state = Arc::new(AppState::new(config)?);

    web::start_web_server(state).await?;

    info!("🛑 Server shutdown complete");
    Ok(())
}
