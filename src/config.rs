//! Configuration module for Inboxen.

use serde::Deserialize;
use std::path::Path;

use crate::content::{HashAlgorithm, Hasher};
use crate::inbox::{DEFAULT_LENGTH, DEFAULT_MAX_ATTEMPTS};
use crate::{InboxenError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/inboxen.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/inboxen.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Inbox address generation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InboxConfig {
    /// Length of generated local parts.
    #[serde(default = "default_inbox_length")]
    pub length: usize,
    /// Insert attempts before giving up on finding a free local part.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_inbox_length() -> usize {
    DEFAULT_LENGTH
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            length: default_inbox_length(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Content hashing configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HashingConfig {
    /// Digest algorithm used for body and header dedup keys.
    #[serde(default)]
    pub algorithm: HashAlgorithm,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Inbox generation configuration.
    #[serde(default)]
    pub inbox: InboxConfig,
    /// Content hashing configuration.
    #[serde(default)]
    pub hashing: HashingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(InboxenError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| InboxenError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `INBOXEN_DATABASE_PATH`: Override the database path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("INBOXEN_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Hasher for the configured content hash algorithm.
    pub fn hasher(&self) -> Hasher {
        Hasher::new(self.hashing.algorithm)
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the inbox length is zero
    /// - max_attempts is zero
    pub fn validate(&self) -> Result<()> {
        if self.inbox.length == 0 {
            return Err(InboxenError::Config(
                "inbox.length must be at least 1".to_string(),
            ));
        }
        if self.inbox.max_attempts == 0 {
            return Err(InboxenError::Config(
                "inbox.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
