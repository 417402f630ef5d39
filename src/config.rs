//! Freshness-window configuration.
//!
//! The exact TTL per entity kind tracks the backend's update cadence, so it
//! is configurable per cache key rather than hard-coded at call sites.
//! Overrides load from `~/.config/hexmap/cache.json`; a missing file means
//! defaults. Only TTLs live here - cached data itself never persists.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "hexmap";

/// Config file name
const CONFIG_FILE: &str = "cache.json";

/// Conservative default freshness window in seconds. Most collections
/// change no faster than roughly once a minute on the backend.
const DEFAULT_TTL_SECS: u64 = 60;

/// Per-collection TTLs, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub owned_hotspots_secs: u64,
    pub followed_hotspots_secs: u64,
    pub my_validators_secs: u64,
    pub elected_validators_secs: u64,
    pub followed_validators_secs: u64,
    pub hex_buckets_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            owned_hotspots_secs: DEFAULT_TTL_SECS,
            followed_hotspots_secs: DEFAULT_TTL_SECS,
            my_validators_secs: DEFAULT_TTL_SECS,
            elected_validators_secs: DEFAULT_TTL_SECS,
            followed_validators_secs: DEFAULT_TTL_SECS,
            hex_buckets_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl TtlConfig {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn owned_hotspots(&self) -> Duration {
        Duration::from_secs(self.owned_hotspots_secs)
    }

    pub fn followed_hotspots(&self) -> Duration {
        Duration::from_secs(self.followed_hotspots_secs)
    }

    pub fn my_validators(&self) -> Duration {
        Duration::from_secs(self.my_validators_secs)
    }

    pub fn elected_validators(&self) -> Duration {
        Duration::from_secs(self.elected_validators_secs)
    }

    pub fn followed_validators(&self) -> Duration {
        Duration::from_secs(self.followed_validators_secs)
    }

    pub fn hex_buckets(&self) -> Duration {
        Duration::from_secs(self.hex_buckets_secs)
    }
}
