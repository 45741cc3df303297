//! Console settings resolution
//!
//! The effective console level and style are derived from the logging config,
//! the verbose flag and, when no style is configured, whether stdout is an
//! interactive terminal.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::LoggingConfig;
use crate::logging::LogLevel;

/// Console line style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleStyle {
    /// Colored, human-oriented lines for interactive terminals
    Pretty,
    /// Dense, uncolored lines for redirected output
    Compact,
    /// One JSON object per line
    Json,
}

/// Error returned when a string does not name a console style
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown console style '{0}' (expected pretty, compact or json)")]
pub struct ParseStyleError(pub String);

impl ConsoleStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleStyle::Pretty => "pretty",
            ConsoleStyle::Compact => "compact",
            ConsoleStyle::Json => "json",
        }
    }
}

impl FromStr for ConsoleStyle {
    type Err = ParseStyleError;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(ConsoleStyle::Pretty),
            "compact" => Ok(ConsoleStyle::Compact),
            "json" => Ok(ConsoleStyle::Json),
            other => Err(ParseStyleError(other.to_string())),
        }
    }
}

impl fmt::Display for ConsoleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective console settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub level: LogLevel,
    pub style: ConsoleStyle,
}

/// Compute console settings from scratch.
///
/// Verbose mode forces `debug`; otherwise the configured console level is used,
/// defaulting to `info`. A recognized configured style wins; otherwise the
/// style is `compact` when stdout is not a terminal and `pretty` when it is.
/// `stdout_is_terminal` is only called when no style is configured.
pub fn resolve_console_settings(
    config: &LoggingConfig,
    verbose: bool,
    stdout_is_terminal: impl FnOnce() -> bool,
) -> ConsoleSettings {
    let level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::normalize(config.console_level.as_deref(), LogLevel::Info)
    };

    let configured = config
        .console_style
        .as_deref()
        .and_then(|s| s.parse::<ConsoleStyle>().ok());
    let style = configured.unwrap_or_else(|| {
        if stdout_is_terminal() {
            ConsoleStyle::Pretty
        } else {
            ConsoleStyle::Compact
        }
    });

    ConsoleSettings { level, style }
}

/// Inputs a resolution depends on, apart from terminal interactivity
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SettingsKey {
    pub console_level: Option<String>,
    pub console_style: Option<String>,
    pub verbose: bool,
}

impl SettingsKey {
    pub fn new(config: &LoggingConfig, verbose: bool) -> Self {
        Self {
            console_level: config.console_level.clone(),
            console_style: config.console_style.clone(),
            verbose,
        }
    }
}

/// Last resolved settings together with the inputs they came from
#[derive(Debug, Clone)]
pub(crate) struct CachedSettings {
    pub key: SettingsKey,
    pub settings: ConsoleSettings,
}
