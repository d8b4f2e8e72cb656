//! Distribution server configuration.

use serde::{Deserialize, Serialize};

/// Distribution server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Snapshot publish cadence in milliseconds.
    #[serde(default = "default_publish_interval_ms")]
    pub publish_interval_ms: u64,
    /// Maximum concurrent WebSocket clients.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Frame relay channel depth between acquisition and distribution.
    #[serde(default = "default_bridge_capacity")]
    pub bridge_capacity: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_publish_interval_ms() -> u64 {
    25
}

fn default_max_connections() -> usize {
    8
}

fn default_bridge_capacity() -> usize {
    dash_bridge::DEFAULT_BRIDGE_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            publish_interval_ms: default_publish_interval_ms(),
            max_connections: default_max_connections(),
            bridge_capacity: default_bridge_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wire_contract() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8001);
        assert!(config.publish_interval_ms > 0);
        assert!(config.max_connections > 0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ServerConfig = toml::from_str("port = 9001").unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.bridge_capacity, dash_bridge::DEFAULT_BRIDGE_CAPACITY);
    }
}
