//! Engine configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Knobs for one game session. Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the engine RNG
    pub seed: u64,
    pub events_enabled: bool,
    /// Percentage points added to the base event trigger chance
    pub event_chance_bonus: f64,
    pub decisions_enabled: bool,
    /// Turns an environmental program keeps the cleanup active
    pub cleanup_program_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 2500,
            events_enabled: true,
            event_chance_bonus: 0.0,
            decisions_enabled: true,
            cleanup_program_turns: 3,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// No random events and no scripted decisions. Turns become a pure
    /// function of the state and the actions taken.
    pub fn deterministic() -> Self {
        Self {
            events_enabled: false,
            decisions_enabled: false,
            ..Default::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.seed, 2500);
        assert!(config.events_enabled);
        assert!(config.decisions_enabled);
        assert_eq!(config.event_chance_bonus, 0.0);
        assert_eq!(config.cleanup_program_turns, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("seed = 7\nevents_enabled = false\n").unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.events_enabled);
        assert!(config.decisions_enabled);
        assert_eq!(config.cleanup_program_turns, 3);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_bad_toml_is_rejected() {
        let err = GameConfig::from_toml_str("seed = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/nonexistent/planet.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config =
            GameConfig::from_toml_str(include_str!("../../../data/default_config.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_deterministic_preset() {
        let config = GameConfig::deterministic();
        assert!(!config.events_enabled);
        assert!(!config.decisions_enabled);
        assert_eq!(config.seed, GameConfig::default().seed);
    }
}
