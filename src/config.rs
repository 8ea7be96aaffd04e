//! Application configuration.
//!
//! Loaded from ~/.notekit/config.json; a missing or unparseable file falls
//! back to defaults with a warning rather than failing startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::ChipColor;
use crate::error::NotekitError;

pub const DEFAULT_TRASH_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Days a trashed note survives before pruning.
    pub trash_retention_days: u32,
    /// Color for chips inserted without an explicit color.
    pub default_chip_color: ChipColor,
    /// User id used when none is given on the command line.
    pub default_owner: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trash_retention_days: DEFAULT_TRASH_RETENTION_DAYS,
            default_chip_color: ChipColor::Accent,
            default_owner: "local".to_string(),
        }
    }
}

/// Config file location (~/.notekit/config.json).
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".notekit"))
        .unwrap_or_else(|| PathBuf::from(".notekit"))
        .join("config.json")
}

/// Load the config, falling back to defaults on any failure.
pub fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        debug!("No config file, using defaults");
        return Config::default();
    }
    match try_load(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

fn try_load(path: &std::path::Path) -> Result<Config, NotekitError> {
    let raw = std::fs::read_to_string(path).map_err(|e| NotekitError::Config {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), "Config loaded");
    Ok(config)
}
