//! Fakes shared by the console tests

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::host::ConsoleHost;
use super::{ConsoleFn, ConsoleMethod, ConsoleSlots};
use crate::config::LoggingConfig;
use crate::console::format_console_args;
use crate::logging::{FileLogger, LogLevel};

/// Write failures a fake can be told to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    BrokenPipe,
    #[cfg(unix)]
    Eio,
    PermissionDenied,
}

impl Failure {
    pub fn to_error(self) -> io::Error {
        match self {
            Failure::BrokenPipe => io::Error::from(io::ErrorKind::BrokenPipe),
            #[cfg(unix)]
            Failure::Eio => io::Error::from_raw_os_error(libc::EIO),
            Failure::PermissionDenied => io::Error::from(io::ErrorKind::PermissionDenied),
        }
    }
}

/// Ordered record of everything the fakes saw
pub type Journal = Arc<Mutex<Vec<String>>>;

pub struct FakeHost {
    pub config: Mutex<LoggingConfig>,
    pub verbose: AtomicBool,
    pub terminal: AtomicBool,
    pub terminal_queries: AtomicUsize,
    pub stderr: Mutex<String>,
    pub stderr_failure: Mutex<Option<Failure>>,
    journal: Journal,
}

impl FakeHost {
    pub fn new(journal: &Journal) -> Self {
        Self {
            config: Mutex::new(LoggingConfig::default()),
            verbose: AtomicBool::new(false),
            terminal: AtomicBool::new(true),
            terminal_queries: AtomicUsize::new(0),
            stderr: Mutex::new(String::new()),
            stderr_failure: Mutex::new(None),
            journal: Arc::clone(journal),
        }
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::SeqCst);
    }

    pub fn fail_stderr(&self, failure: Failure) {
        *self.stderr_failure.lock().unwrap() = Some(failure);
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.lock().unwrap().clone()
    }

    pub fn terminal_queries(&self) -> usize {
        self.terminal_queries.load(Ordering::SeqCst)
    }
}

impl ConsoleHost for FakeHost {
    fn logging_config(&self) -> LoggingConfig {
        self.config.lock().unwrap().clone()
    }

    fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::SeqCst)
    }

    fn stdout_is_terminal(&self) -> bool {
        self.terminal_queries.fetch_add(1, Ordering::SeqCst);
        self.terminal.load(Ordering::SeqCst)
    }

    fn write_stderr(&self, text: &str) -> io::Result<()> {
        if let Some(failure) = *self.stderr_failure.lock().unwrap() {
            return Err(failure.to_error());
        }
        self.journal.lock().unwrap().push(format!("stderr:{}", text));
        self.stderr.lock().unwrap().push_str(text);
        Ok(())
    }
}

pub struct FakeLogger {
    pub lines: Mutex<Vec<(LogLevel, String)>>,
    pub fail: AtomicBool,
    journal: Journal,
}

impl FakeLogger {
    pub fn new(journal: &Journal) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            journal: Arc::clone(journal),
        }
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl FileLogger for FakeLogger {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("file:{}:{}", level, message));
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.lines.lock().unwrap().push((level, message.to_string()));
        Ok(())
    }
}

/// Console functions that journal `<method>:<formatted>` and the raw argument count
pub fn journaling_slots(journal: &Journal) -> ConsoleSlots {
    let make = |method: ConsoleMethod| -> ConsoleFn {
        let journal = Arc::clone(journal);
        Arc::new(move |args: &[Value]| -> io::Result<()> {
            journal.lock().unwrap().push(format!(
                "{}:{}#{}",
                method.as_str(),
                format_console_args(args),
                args.len()
            ));
            Ok(())
        })
    };
    ConsoleSlots {
        log: make(ConsoleMethod::Log),
        info: make(ConsoleMethod::Info),
        warn: make(ConsoleMethod::Warn),
        error: make(ConsoleMethod::Error),
        debug: make(ConsoleMethod::Debug),
        trace: make(ConsoleMethod::Trace),
    }
}

/// Console function that always fails
pub fn failing_fn(failure: Failure) -> ConsoleFn {
    Arc::new(move |_args: &[Value]| -> io::Result<()> { Err(failure.to_error()) })
}
