//! TOML configuration for the tracker binary.
//!
//! Everything is optional. A missing file means built-in defaults, and
//! command line flags override whatever the file says. Example:
//!
//! ```toml
//! database = "/home/me/.habit_tracker/tracker.db"
//! notifier = "log"
//!
//! [default_milestones]
//! time = "08:30"
//! milestones = [7, 30, 100]
//!
//! [default_fasting]
//! fastingHours = 18
//! eatingWindowHours = 6
//! isActive = true
//! ```
//!
//! The `default_*` tables only seed settings the store has never saved;
//! once the user changes them through the tools the stored values win.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainError, FastingSettings};
use crate::notify::{NotifierKind, StreakNotificationSettings};
use crate::tracker::TrackerDefaults;

const CONFIG_DIR: &str = "habit_tracker";
const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// SQLite database file; resolved from the home directory when absent
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub notifier: NotifierKind,
    #[serde(default)]
    pub default_milestones: StreakNotificationSettings,
    #[serde(default)]
    pub default_fasting: FastingSettings,
}

impl TrackerConfig {
    /// Where the config file lives when no path is given
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(CONFIG_DIR);
            p.push(CONFIG_FILE);
            p
        })
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and silently skipped if there is no file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.default_milestones.validate()?;
        config.default_fasting.validate()?;
        Ok(config)
    }

    pub fn tracker_defaults(&self) -> TrackerDefaults {
        TrackerDefaults {
            fasting: self.default_fasting.clone(),
            streak_notifications: self.default_milestones.clone(),
        }
    }
}
