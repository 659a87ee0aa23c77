use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

// Re-export existing config types
pub use crate::nats::NatsConfig;
pub use crate::relay::RelayInfo;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "TOTEM_CONFIG";

/// Complete Totem configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TotemConfig {
    #[serde(default)]
    pub pets: PetsConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub relay: RelayInfo,
}

/// Pet timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PetsConfig {
    /// How often decay is applied (milliseconds)
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,
    /// How often each pet publishes its status (seconds)
    #[serde(default = "default_status_interval_seconds")]
    pub status_interval_seconds: u64,
    /// Deadline for a single outbound publish (seconds)
    #[serde(default = "default_publish_timeout_seconds")]
    pub publish_timeout_seconds: u64,
}

fn default_decay_interval_ms() -> u64 {
    1000
}

fn default_status_interval_seconds() -> u64 {
    60
}

fn default_publish_timeout_seconds() -> u64 {
    5
}

impl Default for PetsConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms: default_decay_interval_ms(),
            status_interval_seconds: default_status_interval_seconds(),
            publish_timeout_seconds: default_publish_timeout_seconds(),
        }
    }
}

impl PetsConfig {
    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms.max(1))
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_seconds.max(1))
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_seconds.max(1))
    }
}

/// Inspection API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3334".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<TotemConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path))?;
    let config: TotemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file '{}'", path))?;
    Ok(config)
}

/// Config from `$TOTEM_CONFIG`, or defaults when it is unset
pub fn load_from_env() -> Result<TotemConfig> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_config(&path),
        Err(_) => Ok(TotemConfig::default()),
    }
}
