//! Console output and its capture layer
//!
//! `Console` is the replaceable set of leveled output functions
//! (`log/info/warn/error/debug/trace`). `ConsoleCapture` swaps those functions
//! for wrappers that tee every call into the file log while still writing to
//! the original destination.

pub mod capture;
pub mod errors;
pub mod filter;
pub mod format;
pub mod host;
pub mod settings;
mod state;
pub mod subsystem;
#[cfg(test)]
pub(crate) mod testing;

pub use capture::ConsoleCapture;
pub use errors::{categorize_write_error, is_broken_destination, DestinationErrorKind};
pub use filter::{should_suppress_console_message, SubsystemFilter, SUPPRESSED_CONSOLE_PREFIXES};
pub use format::format_console_args;
pub use host::{ConsoleHost, ProcessHost};
pub use settings::{resolve_console_settings, ConsoleSettings, ConsoleStyle};
pub use subsystem::SubsystemLogger;

use std::io::{self, Write};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::logging::LogLevel;

/// A console output function: receives the raw call arguments
pub type ConsoleFn = Arc<dyn Fn(&[Value]) -> io::Result<()> + Send + Sync>;

/// The six console entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleMethod {
    Log,
    Info,
    Warn,
    Error,
    Debug,
    Trace,
}

impl ConsoleMethod {
    /// All methods in declaration order
    pub const ALL: [ConsoleMethod; 6] = [
        ConsoleMethod::Log,
        ConsoleMethod::Info,
        ConsoleMethod::Warn,
        ConsoleMethod::Error,
        ConsoleMethod::Debug,
        ConsoleMethod::Trace,
    ];

    /// Severity a call to this method is recorded at
    pub fn level(&self) -> LogLevel {
        match self {
            ConsoleMethod::Log | ConsoleMethod::Info => LogLevel::Info,
            ConsoleMethod::Warn => LogLevel::Warn,
            ConsoleMethod::Error => LogLevel::Error,
            ConsoleMethod::Debug => LogLevel::Debug,
            ConsoleMethod::Trace => LogLevel::Trace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleMethod::Log => "log",
            ConsoleMethod::Info => "info",
            ConsoleMethod::Warn => "warn",
            ConsoleMethod::Error => "error",
            ConsoleMethod::Debug => "debug",
            ConsoleMethod::Trace => "trace",
        }
    }
}

/// Full set of console functions
#[derive(Clone)]
pub struct ConsoleSlots {
    pub log: ConsoleFn,
    pub info: ConsoleFn,
    pub warn: ConsoleFn,
    pub error: ConsoleFn,
    pub debug: ConsoleFn,
    pub trace: ConsoleFn,
}

impl ConsoleSlots {
    pub fn get(&self, method: ConsoleMethod) -> &ConsoleFn {
        match method {
            ConsoleMethod::Log => &self.log,
            ConsoleMethod::Info => &self.info,
            ConsoleMethod::Warn => &self.warn,
            ConsoleMethod::Error => &self.error,
            ConsoleMethod::Debug => &self.debug,
            ConsoleMethod::Trace => &self.trace,
        }
    }

    /// Build a new set by transforming each function
    pub fn map(&self, mut f: impl FnMut(ConsoleMethod, &ConsoleFn) -> ConsoleFn) -> ConsoleSlots {
        ConsoleSlots {
            log: f(ConsoleMethod::Log, &self.log),
            info: f(ConsoleMethod::Info, &self.info),
            warn: f(ConsoleMethod::Warn, &self.warn),
            error: f(ConsoleMethod::Error, &self.error),
            debug: f(ConsoleMethod::Debug, &self.debug),
            trace: f(ConsoleMethod::Trace, &self.trace),
        }
    }

    fn get_mut(&mut self, method: ConsoleMethod) -> &mut ConsoleFn {
        match method {
            ConsoleMethod::Log => &mut self.log,
            ConsoleMethod::Info => &mut self.info,
            ConsoleMethod::Warn => &mut self.warn,
            ConsoleMethod::Error => &mut self.error,
            ConsoleMethod::Debug => &mut self.debug,
            ConsoleMethod::Trace => &mut self.trace,
        }
    }
}

/// Where a stdio console function writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Build a console function writing one formatted line to a standard stream.
///
/// Write failures come back as `io::Error` rather than panicking like `println!`.
fn stdio_fn(stream: Stream, prefix: &'static str) -> ConsoleFn {
    Arc::new(move |args: &[Value]| -> io::Result<()> {
        let line = format!("{}{}\n", prefix, format_console_args(args));
        match stream {
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            Stream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(line.as_bytes())?;
                err.flush()
            }
        }
    })
}

/// Replaceable leveled console output functions
pub struct Console {
    slots: RwLock<ConsoleSlots>,
}

impl Console {
    /// Console with explicit functions
    pub fn new(slots: ConsoleSlots) -> Self {
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Console writing to the process's standard streams
    ///
    /// `log`, `info` and `debug` go to stdout; `warn`, `error` and `trace` go to
    /// stderr, with `trace` lines prefixed by `Trace: `.
    pub fn stdio() -> Self {
        Self::new(ConsoleSlots {
            log: stdio_fn(Stream::Stdout, ""),
            info: stdio_fn(Stream::Stdout, ""),
            warn: stdio_fn(Stream::Stderr, ""),
            error: stdio_fn(Stream::Stderr, ""),
            debug: stdio_fn(Stream::Stdout, ""),
            trace: stdio_fn(Stream::Stderr, "Trace: "),
        })
    }

    /// Current function behind a method
    pub fn get(&self, method: ConsoleMethod) -> ConsoleFn {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.get(method))
    }

    /// Replace the function behind a method
    pub fn set(&self, method: ConsoleMethod, f: ConsoleFn) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        *slots.get_mut(method) = f;
    }

    /// Copy of every current function
    pub fn snapshot(&self) -> ConsoleSlots {
        self.slots.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace every function at once
    pub fn restore(&self, slots: ConsoleSlots) {
        *self.slots.write().unwrap_or_else(|e| e.into_inner()) = slots;
    }

    /// Invoke a method. The lock is released before the function runs, so the
    /// function may itself call back into the console.
    pub fn call(&self, method: ConsoleMethod, args: &[Value]) -> io::Result<()> {
        let f = self.get(method);
        f(args)
    }

    pub fn log(&self, args: &[Value]) -> io::Result<()> {
        self.call(ConsoleMethod::Log, args)
    }

    pub fn info(&self, args: &[Value]) -> io::Result<()> {
        self.call(ConsoleMethod::Info, args)
    }

    pub fn warn(&self, args: &[Value]) -> io::Result<()> {
        self.call(ConsoleMethod::Warn, args)
    }

    pub fn error(&self, args: &[Value]) -> io::Result<()> {
        self.call(ConsoleMethod::Error, args)
    }

    pub fn debug(&self, args: &[Value]) -> io::Result<()> {
        self.call(ConsoleMethod::Debug, args)
    }

    pub fn trace(&self, args: &[Value]) -> io::Result<()> {
        self.call(ConsoleMethod::Trace, args)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

/// Saved pre-capture functions, for writes that must bypass interception
#[derive(Clone)]
pub struct RawConsole {
    pub log: ConsoleFn,
    pub info: ConsoleFn,
    pub warn: ConsoleFn,
    pub error: ConsoleFn,
}

impl RawConsole {
    fn from_slots(slots: &ConsoleSlots) -> Self {
        Self {
            log: Arc::clone(&slots.log),
            info: Arc::clone(&slots.info),
            warn: Arc::clone(&slots.warn),
            error: Arc::clone(&slots.error),
        }
    }

    /// Function matching a severity: error/fatal, warn, or log for the rest
    pub fn for_level(&self, level: LogLevel) -> &ConsoleFn {
        match level {
            LogLevel::Error | LogLevel::Fatal => &self.error,
            LogLevel::Warn => &self.warn,
            LogLevel::Trace | LogLevel::Debug | LogLevel::Info => &self.log,
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __console_call {
    ($console:expr, $method:ident, $($arg:expr),+ $(,)?) => {
        $console.$method(&[$($crate::serde_json::json!($arg)),+])
    };
}

/// `console.log` with printf-style arguments
///
/// ```
/// use echolog::console::Console;
/// use echolog::console_log;
///
/// let console = Console::stdio();
/// let _ = console_log!(console, "%s has %d items", "cart", 3);
/// ```
#[macro_export]
macro_rules! console_log {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $crate::__console_call!($console, log, $($arg),+)
    };
}

#[macro_export]
macro_rules! console_info {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $crate::__console_call!($console, info, $($arg),+)
    };
}

#[macro_export]
macro_rules! console_warn {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $crate::__console_call!($console, warn, $($arg),+)
    };
}

#[macro_export]
macro_rules! console_error {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $crate::__console_call!($console, error, $($arg),+)
    };
}

#[macro_export]
macro_rules! console_debug {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $crate::__console_call!($console, debug, $($arg),+)
    };
}

#[macro_export]
macro_rules! console_trace {
    ($console:expr, $($arg:expr),+ $(,)?) => {
        $crate::__console_call!($console, trace, $($arg),+)
    };
}
