// Top-level configuration for the iris driver

use serde::{Deserialize, Serialize};
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Root configuration file.
///
/// The `vision` table is kept opaque so this crate does not depend on the
/// crates that interpret it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IrisConfig {
    pub log: LogConfig,
    pub vision: Option<toml::Value>,
}

impl IrisConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Load configuration from string (TOML, then JSON)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let toml_err = match toml::from_str::<IrisConfig>(content) {
            Ok(config) => return Ok(config),
            Err(e) => e,
        };

        if let Ok(config) = serde_json::from_str::<IrisConfig>(content) {
            return Ok(config);
        }

        Err(ConfigError::ParseError(toml_err.to_string()))
    }

    /// Apply environment overrides
    pub fn from_env(mut self) -> Self {
        if let Ok(level) = std::env::var("IRIS_LOG_LEVEL") {
            self.log.level = level;
        }
        self
    }

    /// Deserialize the opaque `vision` table into a concrete config type.
    pub fn vision_section<T: serde::de::DeserializeOwned + Default>(&self) -> Result<T, ConfigError> {
        match &self.vision {
            Some(table) => table
                .clone()
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::ParseError(format!("[vision]: {}", e))),
            None => Ok(T::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log.level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.log.level
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
