//! Configuration
//!
//! Layered with figment, later layers winning:
//! 1. Built-in defaults
//! 2. A TOML file (`dicer.toml` unless a path is given)
//! 3. `DICER_` environment variables, `__` separating nested keys
//!    (e.g. `DICER_PREFERENCES__SKIN_ID=ocean`)

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prefs::UserPreferences;
use crate::session::DEFAULT_MAX_DICE;
use crate::source::{TumblerConfig, WatchdogConfig};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "dicer.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DICER_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Most dice a single roll may ask for
    pub max_dice: u32,
    pub watchdog: WatchdogConfig,
    pub tumbler: TumblerConfig,
    pub preferences: UserPreferences,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dice: DEFAULT_MAX_DICE,
            watchdog: WatchdogConfig::default(),
            tumbler: TumblerConfig::default(),
            preferences: UserPreferences::default(),
        }
    }
}

impl Config {
    /// Build the figment for an optional explicit config file
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
        }
        Self::figment(path).extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}
