//! Log severity levels
//!
//! Shared by the console capture layer (as the tag forwarded to the file logger)
//! and by subsystem loggers (as a console threshold).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Log severity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Error returned when a string does not name a known level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl LogLevel {
    /// All levels in ascending severity
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Lowercase name, as written in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Parse an optional level name, falling back to `default` when it is
    /// absent or unrecognized
    pub fn normalize(value: Option<&str>, default: LogLevel) -> LogLevel {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// The level used when handing a message to the file logger.
    ///
    /// The file logger has no fatal level, so fatal collapses into error.
    pub fn file_level(&self) -> LogLevel {
        match self {
            LogLevel::Fatal => LogLevel::Error,
            other => *other,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Fatal => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" WARN ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err(ParseLevelError("loud".to_string()))
        );
    }

    #[test]
    fn test_normalize_defaults() {
        assert_eq!(LogLevel::normalize(None, LogLevel::Info), LogLevel::Info);
        assert_eq!(
            LogLevel::normalize(Some("nonsense"), LogLevel::Info),
            LogLevel::Info
        );
        assert_eq!(
            LogLevel::normalize(Some("trace"), LogLevel::Info),
            LogLevel::Trace
        );
    }

    #[test]
    fn test_file_level_collapses_fatal() {
        assert_eq!(LogLevel::Fatal.file_level(), LogLevel::Error);
        assert_eq!(LogLevel::Warn.file_level(), LogLevel::Warn);
        assert_eq!(LogLevel::Trace.file_level(), LogLevel::Trace);
    }

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(tracing::Level::from(LogLevel::Fatal), tracing::Level::ERROR);
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
    }
}
