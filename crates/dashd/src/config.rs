//! Application configuration.

use crate::error::{AppError, AppResult};
use dash_client::SubscriptionConfig;
use dash_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bus acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// CAN channel name for the hardware source.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Emission interval of the synthetic source, in milliseconds.
    #[serde(default = "default_synthetic_tick_ms")]
    pub synthetic_tick_ms: u64,
}

fn default_channel() -> String {
    "can0".to_string()
}

fn default_synthetic_tick_ms() -> u64 {
    10
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            synthetic_tick_ms: default_synthetic_tick_ms(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: SubscriptionConfig,
}

impl AppConfig {
    /// Load configuration: explicit path, else `DASHD_CONFIG`, else the
    /// default file, else built-in defaults when no file exists.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let config_path = path
            .map(str::to_string)
            .or_else(|| std::env::var("DASHD_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.bus.synthetic_tick_ms == 0 {
            return Err(AppError::Config("bus.synthetic_tick_ms must be > 0".into()));
        }
        if self.server.publish_interval_ms == 0 {
            return Err(AppError::Config(
                "server.publish_interval_ms must be > 0".into(),
            ));
        }
        if self.server.max_connections == 0 {
            return Err(AppError::Config("server.max_connections must be > 0".into()));
        }
        if self.server.bridge_capacity == 0 {
            return Err(AppError::Config("server.bridge_capacity must be > 0".into()));
        }
        if self.client.url.is_empty() {
            return Err(AppError::Config("client.url must be set".into()));
        }
        Ok(())
    }
}
