//! Plugin configuration.
//!
//! The config lives in a JSON5 file. When the file does not exist yet it is
//! created with the defaults so server owners have something to edit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::GameMode;

/// An error that can occur while loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Config file {path} could not be accessed: {source}")]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The file is not valid JSON5 or does not match the schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),
    /// The defaults could not be serialized.
    #[error("Failed to serialize default config: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Top level plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyblockConfig {
    /// Island teleport settings.
    pub teleport: TeleportConfig,
}

/// Settings for delayed island teleports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    /// Seconds a player has to stand still before being teleported.
    /// Zero teleports immediately.
    pub delay_seconds: u32,
    /// How far a player may drift from where they asked to teleport before the
    /// teleport is cancelled. Small enough that looking around never cancels.
    pub cancel_distance: f64,
    /// Whether to save the player's inventory right before they arrive.
    pub save_inventory: bool,
    /// Game mode to switch players into once they arrive.
    pub game_mode: Option<GameMode>,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 2,
            cancel_distance: 0.2,
            save_inventory: false,
            game_mode: None,
        }
    }
}

impl TeleportConfig {
    /// The countdown as a duration.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_seconds) * 1000)
    }

    /// Whether teleports skip the countdown entirely.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.delay_seconds == 0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.cancel_distance.is_finite() || self.cancel_distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "teleport.cancel_distance must be a non-negative number, got {}",
                self.cancel_distance
            )));
        }
        Ok(())
    }
}

impl SkyblockConfig {
    /// Parses a config from JSON5 text. Missing fields take their defaults.
    pub fn from_json5(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json5::from_str(text)?;
        config.teleport.validate()?;
        Ok(config)
    }

    /// Loads the config at `path`, writing the defaults there first if the
    /// file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if !path.exists() {
            let config = Self::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            fs::write(path, serde_json::to_string_pretty(&config)?).map_err(io_err)?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let text = fs::read_to_string(path).map_err(io_err)?;
        Self::from_json5(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plugin_defaults() {
        let config = TeleportConfig::default();
        assert_eq!(config.delay_seconds, 2);
        assert!((config.cancel_distance - 0.2).abs() < f64::EPSILON);
        assert!(!config.save_inventory);
        assert_eq!(config.game_mode, None);
        assert_eq!(config.delay(), Duration::from_millis(2000));
    }

    #[test]
    fn partial_json5_keeps_defaults() {
        let config = SkyblockConfig::from_json5(
            r#"{
                // only override what we care about
                teleport: { delay_seconds: 0, game_mode: "creative" },
            }"#,
        )
        .expect("valid config");

        assert!(config.teleport.is_instant());
        assert_eq!(config.teleport.game_mode, Some(GameMode::Creative));
        assert!((config.teleport.cancel_distance - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_cancel_distance_is_rejected() {
        let err = SkyblockConfig::from_json5("{ teleport: { cancel_distance: -1.0 } }")
            .expect_err("negative distance");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = SkyblockConfig::from_json5("{ teleport: ").expect_err("truncated");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = std::env::temp_dir().join(format!("skyblock-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("skyblock.json5");

        let created = SkyblockConfig::load_or_create(&path).expect("created");
        assert_eq!(created, SkyblockConfig::default());
        assert!(path.exists());

        let reloaded = SkyblockConfig::load_or_create(&path).expect("reloaded");
        assert_eq!(reloaded, created);

        let _ = fs::remove_dir_all(dir);
    }
}
