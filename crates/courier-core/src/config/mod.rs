mod channels;
mod defaults;
mod tracker;

#[cfg(test)]
mod tests;

pub use channels::*;
pub use tracker::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::CourierError;
use defaults::*;

/// Top-level Courier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub courier: CourierConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Payment record storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    /// JSON file mirroring every stored record.
    #[serde(default = "default_payments_file")]
    pub file: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            file: default_payments_file(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, CourierError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| CourierError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse(&content)
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, CourierError> {
    let config: Config = toml::from_str(content)
        .map_err(|e| CourierError::Config(format!("failed to parse config: {}", e)))?;

    if config.tracker.poll_interval_secs == 0 {
        return Err(CourierError::Config(
            "tracker.poll_interval_secs must be greater than zero".into(),
        ));
    }

    Ok(config)
}
