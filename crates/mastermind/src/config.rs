//! Service configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use mastermind_engine::DEFAULT_TIME_LIMIT_SECS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding the random.org endpoint.
pub const RANDOM_ORG_URL_VAR: &str = "RANDOM_ORG_BASE_URL";

/// Where secrets come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    /// The random.org integer generator over HTTP.
    RandomOrg,
    /// The local thread RNG.
    Local,
}

/// Configuration for the game service and CLI.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Secret supplier to use.
    #[serde(default = "default_secret_source")]
    secret_source: SecretSource,

    /// Base URL of the random.org integer generator.
    #[serde(default = "default_random_org_base_url")]
    random_org_base_url: String,

    /// Time limit for timed sessions, in seconds.
    #[serde(default = "default_time_limit_secs")]
    time_limit_secs: u32,
}

#[instrument]
fn default_db_path() -> String {
    "mastermind.db".to_string()
}

#[instrument]
fn default_secret_source() -> SecretSource {
    SecretSource::Local
}

#[instrument]
fn default_random_org_base_url() -> String {
    "https://www.random.org/integers/".to_string()
}

#[instrument]
fn default_time_limit_secs() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            secret_source: default_secret_source(),
            random_org_base_url: default_random_org_base_url(),
            time_limit_secs: default_time_limit_secs(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            db_path = %config.db_path,
            source = ?config.secret_source,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.time_limit_secs == 0 {
            return Err(ConfigError::new("time_limit_secs must be positive"));
        }
        Ok(config)
    }

    /// Applies environment overrides (currently `RANDOM_ORG_BASE_URL`).
    #[instrument(skip(self))]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(RANDOM_ORG_URL_VAR) {
            debug!(url = %url, "Using random.org URL from environment");
            self.random_org_base_url = url;
        }
        self
    }

    /// Replaces the database path.
    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = db_path.into();
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
