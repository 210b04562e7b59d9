//! Handlers that forward to the detection backend.
//!
//! Each request makes at most one backend call. Local validation failures
//! answer 400 without contacting the backend.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde_json::Value;
use tracing::{info, warn};

use crate::types::StopStreamRequest;
use crate::upstream::UpstreamReply;
use crate::web::{
    error::{object_body, ApiError},
    SharedState,
};

type ProxyResult = Result<(StatusCode, Json<Value>), ApiError>;

fn relay(reply: UpstreamReply) -> (StatusCode, Json<Value>) {
    (reply.status, Json(reply.body))
}

fn require_stream_id(raw: &str) -> Result<&str, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ApiError::missing("stream_id"))
    } else {
        Ok(trimmed)
    }
}

pub async fn start_stream(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ProxyResult {
    let params: Value = object_body(payload)?;

    let reply = state.upstream.start_stream(params).await?;
    let started = reply
        .body
        .get("stream_id")
        .and_then(Value::as_str)
        .unwrap_or("?");
    info!("▶️ Backend started stream {}", started);
    Ok(relay(reply))
}

pub async fn stop_stream(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ProxyResult {
    let request: StopStreamRequest = object_body(payload)?;
    let stream_id = require_stream_id(request.stream_id.as_deref().unwrap_or_default())?;

    let reply = state.upstream.stop_stream(stream_id).await?;
    info!("⏹️ Backend stopped stream {}", stream_id);
    Ok(relay(reply))
}

pub async fn stream_status(
    State(state): State<SharedState>,
    Path(stream_id): Path<String>,
) -> ProxyResult {
    let stream_id = require_stream_id(&stream_id)?;
    Ok(relay(state.upstream.stream_status(stream_id).await?))
}

/// Relay the backend's multipart MJPEG feed chunk by chunk. Dropping the
/// response body (browser went away) drops the upstream response with it.
pub async fn video_feed(
    State(state): State<SharedState>,
    Path(stream_id): Path<String>,
) -> Result<Response, ApiError> {
    let stream_id = require_stream_id(&stream_id)?.to_string();
    let feed = state.upstream.video_feed(&stream_id).await?;
    info!("🎥 Relaying video feed for stream {}", stream_id);

    let frames = feed
        .response
        .bytes_stream()
        .inspect_err(move |e| warn!("Video feed for {} interrupted: {}", stream_id, e));

    Ok((
        [
            (header::CONTENT_TYPE, feed.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

pub async fn missing_stream_id() -> ApiError {
    ApiError::missing("stream_id")
}

pub async fn shared_stats(State(state): State<SharedState>) -> ProxyResult {
    Ok(relay(state.upstream.shared_stats().await?))
}

pub async fn suspicious_data(State(state): State<SharedState>) -> ProxyResult {
    Ok(relay(state.upstream.suspicious_data().await?))
}

pub async fn list_backend_streams(State(state): State<SharedState>) -> ProxyResult {
    Ok(relay(state.upstream.list_streams().await?))
}

pub async fn reload_db(State(state): State<SharedState>) -> ProxyResult {
    let reply = state.upstream.reload_db().await?;
    info!("🔄 Backend reloaded its database");
    Ok(relay(reply))
}
