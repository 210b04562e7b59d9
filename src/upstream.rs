//! HTTP client for the detection backend.
//!
//! Every call is a single attempt. Network failures surface as
//! [`UpstreamError::Unreachable`]; a reachable backend answering non-2xx
//! surfaces as [`UpstreamError::Status`] carrying the original status and
//! JSON body (or `{}` when the body is not JSON).

use std::time::Duration;

use anyhow::Context;
use reqwest::{header, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;

pub const DEFAULT_FEED_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("backend unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend returned {status}")]
    Status { status: StatusCode, body: Value },
}

/// A successful JSON answer from the backend.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// An open video feed. `response` has not been read yet; consume it with
/// `bytes_stream()` so frames are relayed as they arrive.
#[derive(Debug)]
pub struct VideoFeed {
    pub content_type: String,
    pub response: reqwest::Response,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        // No overall timeout on the client: video feeds stay open indefinitely.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("stream-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self {
            client,
            base_url: config.backend_base().to_string(),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn start_stream(&self, params: Value) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/start_stream");
        self.send_json(self.client.post(&url).json(&params), url).await
    }

    pub async fn stop_stream(&self, stream_id: &str) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/stop_stream");
        let body = json!({ "stream_id": stream_id });
        self.send_json(self.client.post(&url).json(&body), url).await
    }

    pub async fn stream_status(&self, stream_id: &str) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint(&format!(
            "/api/stream_status/{}",
            urlencoding::encode(stream_id)
        ));
        self.send_json(self.client.get(&url), url).await
    }

    pub async fn shared_stats(&self) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/shared_stats");
        self.send_json(self.client.get(&url), url).await
    }

    pub async fn suspicious_data(&self) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/get-suspicious-data");
        self.send_json(self.client.get(&url), url).await
    }

    pub async fn list_streams(&self) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/list_streams");
        self.send_json(self.client.get(&url), url).await
    }

    pub async fn reload_db(&self) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint("/api/reload_db");
        self.send_json(self.client.post(&url), url).await
    }

    /// Open the backend's MJPEG feed. Only the connect timeout applies; the
    /// body is left unread for the caller to stream.
    pub async fn video_feed(&self, stream_id: &str) -> Result<VideoFeed, UpstreamError> {
        let url = self.endpoint(&format!("/video_feed/{}", urlencoding::encode(stream_id)));
        debug!("➡️ GET {} (streaming)", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_json_body(response, &url).await?;
            warn!("Video feed for {} refused by backend: {}", stream_id, status);
            return Err(UpstreamError::Status { status, body });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("multipart/"))
            .unwrap_or(DEFAULT_FEED_CONTENT_TYPE)
            .to_string();

        Ok(VideoFeed { content_type, response })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json(
        &self,
        request: RequestBuilder,
        url: String,
    ) -> Result<UpstreamReply, UpstreamError> {
        debug!("➡️ Forwarding to {}", url);

        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| unreachable_error(&url, e))?;

        let status = response.status();
        let body = read_json_body(response, &url).await?;

        if status.is_success() {
            Ok(UpstreamReply { status, body })
        } else {
            warn!("Backend answered {} for {}", status, url);
            Err(UpstreamError::Status { status, body })
        }
    }
}

async fn read_json_body(response: reqwest::Response, url: &str) -> Result<Value, UpstreamError> {
    let bytes = response.bytes().await.map_err(|e| unreachable_error(url, e))?;
    Ok(serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({})))
}

fn unreachable_error(url: &str, source: reqwest::Error) -> UpstreamError {
    let reason = if source.is_timeout() {
        "timed out"
    } else if source.is_connect() {
        "connection failed"
    } else if source.is_body() || source.is_decode() {
        "body read failed"
    } else {
        "request failed"
    };
    warn!("❌ Backend {} ({}): {}", reason, url, source);
    UpstreamError::Unreachable { url: url.to_string(), source }
}
