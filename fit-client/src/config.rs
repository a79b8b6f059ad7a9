//! Configuration loading for FitTogether.
//!
//! Configuration is loaded from a TOML file (default: `fittogether.toml`).
//! Every section and field is optional.

use fit_core::{
    DEFAULT_APP_NAME, DEFAULT_CLAP_WINDOW_DAYS, DEFAULT_CODE_LENGTH, DEFAULT_WEEKLY_GOAL,
    MAX_CODE_LENGTH, MIN_CODE_LENGTH,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "fittogether.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Pairing configuration.
    #[serde(default)]
    pub pairing: PairingConfig,
    /// Activity configuration.
    #[serde(default)]
    pub activity: ActivityConfig,
    /// Encouragement configuration.
    #[serde(default)]
    pub encouragement: EncouragementConfig,
    /// Share text configuration.
    #[serde(default)]
    pub share: ShareConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
}

/// Pairing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingConfig {
    /// Invite code length (default: 8, allowed 6..=12).
    #[serde(default = "default_invite_code_length")]
    pub invite_code_length: usize,
    /// Codes tried before giving up on a unique one (default: 16).
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
    /// Reconcile both users after a partial pairing failure (default: false).
    #[serde(default)]
    pub auto_reconcile: bool,
}

/// Activity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig {
    /// Workouts fetched for display and aggregation (default: 50).
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    /// Weekly workout goal (default: 5).
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: u32,
    /// Duration used when a workout is logged without one (default: 30).
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
}

/// Encouragement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EncouragementConfig {
    /// Trailing clap window in days (default: 30).
    #[serde(default = "default_clap_window_days")]
    pub clap_window_days: u32,
}

/// Share text configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// App name used in share text (default: "FitTogether").
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from("fittogether.db")
}

fn default_invite_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_max_generation_attempts() -> u32 {
    16
}

fn default_history_limit() -> u32 {
    50
}

fn default_weekly_goal() -> u32 {
    DEFAULT_WEEKLY_GOAL
}

fn default_duration_minutes() -> u32 {
    30
}

fn default_clap_window_days() -> u32 {
    DEFAULT_CLAP_WINDOW_DAYS
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
        }
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            invite_code_length: default_invite_code_length(),
            max_generation_attempts: default_max_generation_attempts(),
            auto_reconcile: false,
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            weekly_goal: default_weekly_goal(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl Default for EncouragementConfig {
    fn default() -> Self {
        Self {
            clap_window_days: default_clap_window_days(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// out-of-range values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.pairing.invite_code_length;
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&len) {
            return Err(ConfigError::Invalid(format!(
                "pairing.invite_code_length must be between {} and {}, got {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH, len
            )));
        }
        if self.pairing.max_generation_attempts == 0 {
            return Err(ConfigError::Invalid(
                "pairing.max_generation_attempts must be at least 1".into(),
            ));
        }
        if self.activity.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "activity.history_limit must be at least 1".into(),
            ));
        }
        if self.activity.default_duration_minutes == 0 {
            return Err(ConfigError::Invalid(
                "activity.default_duration_minutes must be at least 1".into(),
            ));
        }
        if self.encouragement.clap_window_days == 0 {
            return Err(ConfigError::Invalid(
                "encouragement.clap_window_days must be at least 1".into(),
            ));
        }
        if self.share.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid("share.app_name must not be empty".into()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
