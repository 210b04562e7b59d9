use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use anyhow::Context;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{config::AppConfig, registry::StreamRegistry, upstream::UpstreamClient};

pub mod error;
pub mod proxy_endpoints;
pub mod stream_endpoints;

use proxy_endpoints::*;
use stream_endpoints::*;

/// State shared by every handler. Built once at startup.
pub struct AppState {
    pub registry: StreamRegistry,
    pub upstream: UpstreamClient,
    pub config: AppConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self {
            registry: StreamRegistry::new(),
            upstream,
            config,
        })
    }
}

/// Create the gateway router with all endpoints
pub fn create_web_router(state: SharedState) -> Router {
    Router::new()
        // Local stream registry
        .route(
            "/api/streams",
            get(list_streams)
                .post(create_stream)
                .patch(rename_stream)
                .delete(delete_stream),
        )

        // Backend passthrough
        .route("/api/start_stream", post(start_stream))
        .route("/api/stop_stream", post(stop_stream))
        .route("/api/stream_status/", get(missing_stream_id))
        .route("/api/stream_status/:stream_id", get(stream_status))
        .route("/api/video_feed/", get(missing_stream_id))
        .route("/api/video_feed/:stream_id", get(video_feed))
        .route("/api/shared_stats", get(shared_stats))
        .route("/api/get-suspicious-data", get(suspicious_data))
        .route("/api/list_streams", get(list_backend_streams))
        .route("/api/reload_db", post(reload_db))

        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "streams": state.registry.len().await,
        "backend_url": state.upstream.base_url(),
    }))
}

pub async fn start_web_server(state: SharedState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let app = create_web_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    info!("🌐 Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("🛑 Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
