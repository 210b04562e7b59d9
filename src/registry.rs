//! In-memory registry of camera stream records.
//!
//! Records live for the lifetime of the process. All mutations go through a
//! single write lock, so a record is removed or renamed at most once per
//! matching request no matter how many handlers race on it.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::StreamRecord;

const ALLOWED_SCHEMES: [&str; 2] = ["rtsp://", "rtsps://"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),
    #[error("stream {0} not found")]
    NotFound(String),
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, StreamRecord>,
    order: Vec<String>,
}

#[derive(Default)]
pub struct StreamRegistry {
    inner: RwLock<Inner>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Vec<StreamRecord> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect()
    }

    #[allow(dead_code)]
    pub async fn get(&self, id: &str) -> Option<StreamRecord> {
        self.inner.read().await.records.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn create(&self, name: &str, url: &str) -> Result<StreamRecord, RegistryError> {
        let name = require_non_empty(name, "name")?;
        let url = require_non_empty(url, "url")?;
        if !has_allowed_scheme(url) {
            return Err(RegistryError::Validation(
                "url must start with rtsp:// or rtsps://".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        let mut id = Uuid::new_v4().to_string();
        while inner.records.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let record = StreamRecord::new(id.clone(), name.to_string(), url.to_string());
        inner.records.insert(id.clone(), record.clone());
        inner.order.push(id);

        info!("📝 Registered stream {} ({}) -> {}", record.id, record.name, record.url);
        Ok(record)
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<StreamRecord, RegistryError> {
        let name = require_non_empty(name, "name")?;

        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        debug!("Renaming stream {}: {} -> {}", id, record.name, name);
        record.name = name.to_string();
        Ok(record.clone())
    }

    pub async fn delete(&self, id: &str) -> Result<StreamRecord, RegistryError> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .records
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if let Some(pos) = inner.order.iter().position(|entry| entry == id) {
            inner.order.remove(pos);
        }

        info!("🗑️ Removed stream {} ({})", removed.id, removed.name);
        Ok(removed)
    }
}

fn require_non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RegistryError::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed)
    }
}

/// Case-insensitive `rtsp://` / `rtsps://` prefix check.
pub fn has_allowed_scheme(url: &str) -> bool {
    ALLOWED_SCHEMES.iter().any(|scheme| {
        url.get(..scheme.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
