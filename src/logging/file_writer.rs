//! File-based logging with tracing integration
//!
//! Sets up the file log that captured console output is forwarded into, and the
//! `FileLogger` seam the capture layer talks to.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::level::LogLevel;
use crate::config::{self, LoggingConfig};

/// Tracing target used for messages captured from the console
pub const CONSOLE_TARGET: &str = "console";

/// Leveled sink that captured console messages are forwarded to.
///
/// Implementations do their own routing, formatting and persistence. Errors are
/// reported to the caller, which is free to discard them.
pub trait FileLogger: Send + Sync {
    /// Record a pre-formatted message at the given level
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()>;

    fn trace(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Trace, message)
    }

    fn debug(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Debug, message)
    }

    fn info(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Info, message)
    }

    fn warn(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Warn, message)
    }

    fn error(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Error, message)
    }
}

/// `FileLogger` that emits `tracing` events under the `console` target.
///
/// Whatever subscriber is installed (normally the one from
/// [`init_file_logging`]) decides where the events end up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFileLogger;

impl FileLogger for TracingFileLogger {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        match level {
            LogLevel::Trace => tracing::trace!(target: CONSOLE_TARGET, "{}", message),
            LogLevel::Debug => tracing::debug!(target: CONSOLE_TARGET, "{}", message),
            LogLevel::Info => tracing::info!(target: CONSOLE_TARGET, "{}", message),
            LogLevel::Warn => tracing::warn!(target: CONSOLE_TARGET, "{}", message),
            LogLevel::Error | LogLevel::Fatal => {
                tracing::error!(target: CONSOLE_TARGET, "{}", message)
            }
        }
        Ok(())
    }
}

/// Information about the current log file
#[derive(Debug, Clone)]
pub struct LogFileInfo {
    /// Full path to the log file
    pub path: PathBuf,
    /// Level the file log was configured with
    pub level: LogLevel,
}

/// Generate a timestamped log file path
pub fn create_log_file_path(logs_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    logs_dir.join(format!("echolog-{}.log", timestamp))
}

/// Writer that appends to the shared log file
struct FileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().unwrap_or_else(|e| e.into_inner()).flush()
    }
}

/// Writer factory for tracing-subscriber
struct FileWriterMaker {
    file: Arc<Mutex<File>>,
}

impl<'a> MakeWriter<'a> for FileWriterMaker {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter {
            file: Arc::clone(&self.file),
        }
    }
}

/// Guard that keeps the logging system alive
pub struct LoggingGuard {
    file: Arc<Mutex<File>>,
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Resolve where the file log goes: the configured file, or a timestamped file
/// in the default logs directory
pub fn resolve_log_file_path(settings: &LoggingConfig) -> PathBuf {
    settings
        .file
        .clone()
        .unwrap_or_else(|| create_log_file_path(&config::logs_dir()))
}

/// Open (creating parents) the log file in append mode
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create logs directory")?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Initialize file logging
///
/// Installs the global tracing subscriber. Returns the log file info and a guard
/// that must be kept alive for the duration of logging. Fails if a global
/// subscriber is already installed.
pub fn init_file_logging(settings: &LoggingConfig) -> Result<(LogFileInfo, LoggingGuard)> {
    let log_path = resolve_log_file_path(settings);
    let level = settings.file_level();

    let file = Arc::new(Mutex::new(open_log_file(&log_path)?));

    let writer = FileWriterMaker {
        file: Arc::clone(&file),
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.file_level().as_str().into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install file logging subscriber")?;

    tracing::debug!(target: "echolog", path = %log_path.display(), %level, "file logging initialized");

    let info = LogFileInfo {
        path: log_path,
        level,
    };

    Ok((info, LoggingGuard { file }))
}
