use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection state of a registered camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(dead_code)]
pub enum StreamStatus {
    Pending,    // Registered, not yet seen by the backend
    Connected,  // Backend reports frames flowing
    Error,      // Backend failed to open the source
}

impl Default for StreamStatus {
    fn default() -> Self {
        StreamStatus::Pending
    }
}

/// A camera source known to the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: StreamStatus,
    pub created_at: DateTime<Utc>,
}

impl StreamRecord {
    pub fn new(id: String, name: String, url: String) -> Self {
        Self {
            id,
            name,
            url,
            status: StreamStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /api/streams`. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateStreamRequest {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Body of `PATCH /api/streams`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameStreamRequest {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Query of `DELETE /api/streams?id=`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteStreamQuery {
    pub id: Option<String>,
}

/// Body of `POST /api/stop_stream`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StopStreamRequest {
    pub stream_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StreamListResponse {
    pub streams: Vec<StreamRecord>,
}

#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub stream: StreamRecord,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: StreamRecord,
}
