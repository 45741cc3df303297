//! Logging system for Echolog
//!
//! Provides log levels, the `FileLogger` seam and file-based logging through
//! `tracing`.

mod file_writer;
mod level;

pub use file_writer::{
    create_log_file_path, init_file_logging, resolve_log_file_path, FileLogger, LogFileInfo,
    LoggingGuard, TracingFileLogger, CONSOLE_TARGET,
};
pub use level::{LogLevel, ParseLevelError};
