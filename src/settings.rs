//! Static game configuration
//!
//! All tunables are supplied once at startup, either from the built-in
//! defaults or from a JSON file next to the executable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Points awarded per scoring item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    /// Value of one small coin
    pub coin: u32,
    /// Value of one big coin (dropped by shot enemies)
    pub big_coin: u32,
    /// Value of one stomped enemy
    pub enemy: u32,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            coin: 5,
            big_coin: 10,
            enemy: 20,
        }
    }
}

/// Game tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Scoring ===
    pub scores: ScoreTable,

    // === Round flow ===
    /// Max time allowed to complete the level (seconds)
    pub max_time: f32,
    /// Delay before the restart/game-over signal after a life is lost
    pub restart_delay: f32,
    /// Pause while the death animation plays
    pub death_pause: f32,

    // === Player ===
    /// Horizontal speed applied for a full axis deflection
    pub player_speed: f32,

    // === Campaign ===
    /// Number of levels tracked in the save
    pub level_count: u32,
    /// Save file location (defaults to the per-user data directory)
    pub save_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            scores: ScoreTable::default(),

            max_time: DEFAULT_MAX_TIME,
            restart_delay: DEFAULT_RESTART_DELAY,
            death_pause: DEATH_PAUSE,

            player_speed: 5.0,

            level_count: DEFAULT_LEVEL_COUNT,
            save_path: None,
        }
    }
}

impl GameConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load the config file if one is given and usable, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default config");
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Reject values the round flow cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_time must be positive, got {}",
                self.max_time
            )));
        }
        for (name, value) in [
            ("restart_delay", self.restart_delay),
            ("death_pause", self.death_pause),
            ("player_speed", self.player_speed),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.level_count == 0 {
            return Err(ConfigError::Invalid("level_count must be at least 1".into()));
        }
        Ok(())
    }
}
