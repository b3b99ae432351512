use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::{glog_debug, Error, Result};

/// Default coordination period in seconds.
pub const DEFAULT_TICK_SECS: u64 = 5;
/// Default bound on one decision-enhancement call, in milliseconds.
pub const DEFAULT_ENHANCER_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Coordination loop period in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Timeout for one decision-enhancement call in milliseconds.
    #[serde(default = "default_enhancer_timeout_ms")]
    pub enhancer_timeout_ms: u64,
    /// Event channel capacity for coordinator events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}

fn default_enhancer_timeout_ms() -> u64 {
    DEFAULT_ENHANCER_TIMEOUT_MS
}

fn default_event_capacity() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            enhancer_timeout_ms: default_enhancer_timeout_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    pub fn guild_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".guild"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::guild_dir()?.join("guild.toml"))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn enhancer_timeout(&self) -> Duration {
        Duration::from_millis(self.enhancer_timeout_ms)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        glog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            glog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        glog_debug!(
            "Config loaded: tick_secs={}, enhancer_timeout_ms={}",
            config.tick_secs,
            config.enhancer_timeout_ms
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let guild_dir = Self::guild_dir()?;
        if !guild_dir.exists() {
            fs::create_dir_all(&guild_dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        glog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
