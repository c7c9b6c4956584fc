// SPDX-License-Identifier: GPL-3.0-only

//! On-disk configuration (spec.md §6's Non-goal note: the core doesn't
//! parse the original's INI/CSV formats itself, but it still needs *some*
//! persisted settings for the demonstration binary to remember between
//! runs). Grounded on the teacher's `config.rs` shape (a single
//! `#[derive(Serialize, Deserialize)]` struct with a `Default` impl), with
//! `cosmic_config` swapped for plain `toml` + `dirs`, since `cosmic_config`
//! is tied to the GUI application this crate explicitly isn't.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::anti_tear::AntiTearConfig;
use crate::capture::alias::ResolutionAlias;
use crate::errors::{ConfigError, VcsResult};

/// Persisted application settings: the subset of [`crate::app::AppState`]
/// and engine configuration that should survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Whether eco mode starts enabled.
    pub eco_mode_enabled: bool,
    /// Whether the anti-tear engine starts enabled.
    pub anti_tear_enabled: bool,
    /// The anti-tear engine's configuration.
    pub anti_tear: AntiTearConfig,
    /// User-pinned resolution corrections (spec.md §4.4).
    pub aliases: Vec<ResolutionAlias>,
}

impl Default for Config {
    fn default() -> Self {
        Self { eco_mode_enabled: false, anti_tear_enabled: false, anti_tear: AntiTearConfig::default(), aliases: Vec::new() }
    }
}

impl Config {
    /// Loads the configuration from its default path, or returns
    /// [`Config::default`] if no file exists yet.
    pub fn load() -> VcsResult<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|err| ConfigError::Load(err.to_string()))?;
        toml::from_str(&contents).map_err(|err| ConfigError::Load(err.to_string()).into())
    }

    /// Serializes and writes the configuration to its default path,
    /// creating the parent directory if needed.
    pub fn save(&self) -> VcsResult<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ConfigError::Save(err.to_string()))?;
        }

        let contents = toml::to_string_pretty(self).map_err(|err| ConfigError::Save(err.to_string()))?;
        std::fs::write(&path, contents).map_err(|err| ConfigError::Save(err.to_string()).into())
    }

    fn path() -> VcsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("vcs").join("config.toml"))
            .ok_or_else(|| ConfigError::Load("no config directory available on this platform".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_everything_disabled() {
        let config = Config::default();
        assert!(!config.eco_mode_enabled);
        assert!(!config.anti_tear_enabled);
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.eco_mode_enabled = true;
        config.aliases.push(ResolutionAlias {
            from: crate::capture::types::Resolution::new(720, 400, 32),
            to: crate::capture::types::Resolution::new(640, 400, 32),
        });

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }
}
