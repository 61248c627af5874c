//! Driver configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

/// Connection settings for [`CdpDriver`](crate::CdpDriver)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Tags every log line emitted by one driver instance
    pub id: String,
    /// Browser-level DevTools WebSocket endpoint
    pub cdp_url: String,
    /// Upper bound for a single CDP command round-trip
    pub command_timeout_ms: u64,
    /// How long `goto` waits for `document.readyState == "complete"`
    pub load_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            cdp_url: "ws://localhost:9222/devtools/browser".to_string(),
            command_timeout_ms: 10_000,
            load_timeout_ms: 30_000,
        }
    }
}

impl DriverConfig {
    /// Parse from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DriverConfig::from_json(r#"{ "cdp_url": "ws://127.0.0.1:9333" }"#).unwrap();

        assert_eq!(config.cdp_url, "ws://127.0.0.1:9333");
        assert_eq!(config.command_timeout(), Duration::from_secs(10));
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
        assert!(!config.id.is_empty());
    }

    #[test]
    fn test_default_ids_are_unique() {
        assert_ne!(DriverConfig::default().id, DriverConfig::default().id);
    }
}
