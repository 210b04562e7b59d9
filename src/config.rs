use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Result};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub bind_address: String,
    pub web_port: u16,

    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            bind_address: "0.0.0.0".to_string(),
            web_port: 3000,

            request_timeout_ms: 10_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl AppConfig {
    /// Resolve the configuration once at startup: defaults, then `path` if it
    /// exists, then `BACKEND_URL` / `GATEWAY_PORT` / `GATEWAY_BIND` overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(config_str) => serde_json::from_str::<AppConfig>(&config_str)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(_) => {
                tracing::warn!("{} not found, using default configuration", path.display());
                AppConfig::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides. Takes a lookup function so tests
    /// don't have to touch the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BACKEND_URL").filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(bind) = lookup("GATEWAY_BIND").filter(|v| !v.trim().is_empty()) {
            self.bind_address = bind.trim().to_string();
        }
        if let Some(port) = lookup("GATEWAY_PORT") {
            self.web_port = port
                .trim()
                .parse()
                .with_context(|| format!("GATEWAY_PORT is not a valid port: {port}"))?;
        }
        Ok(())
    }

    /// Backend base address without a trailing slash.
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.web_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.backend_url, "http://localhost:5000");
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("BACKEND_URL", "http://detector:8000/"),
            ("GATEWAY_PORT", "8088"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.backend_url, "http://detector:8000/");
        assert_eq!(config.backend_base(), "http://detector:8000");
        assert_eq!(config.web_port, 8088);
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_blank_backend_url_keeps_default() {
        let vars = env(&[("BACKEND_URL", "   ")]);
        let mut config = AppConfig::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let vars = env(&[("GATEWAY_PORT", "eighty")]);
        let mut config = AppConfig::default();
        assert!(config.apply_overrides(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "backend_url": "http://10.0.0.5:5000" }"#).unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.5:5000");
        assert_eq!(config.web_port, 3000);
        assert_eq!(config.connect_timeout_ms, 3_000);
    }
}
