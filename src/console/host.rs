//! Ambient collaborators of the capture layer
//!
//! Configuration, the verbose flag, terminal detection and the error stream
//! are reached through `ConsoleHost` so tests and embedding hosts can replace
//! them.

use std::io::{self, IsTerminal, Write};

use crate::config::LoggingConfig;
use crate::globals;

/// Process environment seen by the console capture layer
pub trait ConsoleHost: Send + Sync {
    /// Logging section of the application configuration
    fn logging_config(&self) -> LoggingConfig;

    /// Whether verbose mode is on
    fn is_verbose(&self) -> bool;

    /// Whether the primary output stream is an interactive terminal
    fn stdout_is_terminal(&self) -> bool;

    /// Write raw text to the error output stream
    fn write_stderr(&self, text: &str) -> io::Result<()>;
}

/// Host backed by the real process: loaded config, the global verbose flag,
/// and the standard streams
#[derive(Debug, Clone, Default)]
pub struct ProcessHost {
    logging: LoggingConfig,
}

impl ProcessHost {
    pub fn new(logging: LoggingConfig) -> Self {
        Self { logging }
    }
}

impl ConsoleHost for ProcessHost {
    fn logging_config(&self) -> LoggingConfig {
        self.logging.clone()
    }

    fn is_verbose(&self) -> bool {
        globals::is_verbose()
    }

    fn stdout_is_terminal(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn write_stderr(&self, text: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(text.as_bytes())?;
        err.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn test_process_host_returns_given_config() {
        let logging = LoggingConfig::with_file(LogLevel::Debug, "/tmp/host.log");
        let host = ProcessHost::new(logging.clone());
        assert_eq!(host.logging_config(), logging);
    }

    #[test]
    fn test_process_host_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProcessHost>();
    }
}
