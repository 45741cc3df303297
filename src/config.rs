//! Configuration management for Echolog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogLevel;

/// Logging section of the config file
///
/// Every field is optional; absent or unrecognized values fall back to
/// computed defaults when the settings are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Threshold for the file log (e.g. "info")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Explicit log file path (default: timestamped file in the logs directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Threshold for console output
    #[serde(
        default,
        alias = "consoleLevel",
        skip_serializing_if = "Option::is_none"
    )]
    pub console_level: Option<String>,

    /// Console line style: "pretty", "compact" or "json"
    #[serde(
        default,
        alias = "consoleStyle",
        skip_serializing_if = "Option::is_none"
    )]
    pub console_style: Option<String>,
}

impl LoggingConfig {
    /// Settings pointing the file log at a specific file, as used by tests and
    /// embedding hosts
    pub fn with_file(level: LogLevel, file: impl Into<PathBuf>) -> Self {
        Self {
            level: Some(level.as_str().to_string()),
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Effective file log level (default: info)
    pub fn file_level(&self) -> LogLevel {
        LogLevel::normalize(self.level.as_deref(), LogLevel::Info)
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path, or return default if not found
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }
}

/// Get the base configuration directory (~/.echolog)
/// Falls back to ./.echolog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".echolog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".echolog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all required directories exist
pub fn ensure_directories() -> Result<()> {
    std::fs::create_dir_all(config_dir()).context("Failed to create config directory")?;
    std::fs::create_dir_all(logs_dir()).context("Failed to create logs directory")?;
    Ok(())
}
