//! Console capture controller
//!
//! Installs wrappers over every console function so each call is formatted,
//! filtered, forwarded to the file logger and then re-emitted to its original
//! destination (or to stderr when routed there). Installation is idempotent and
//! only undone by [`ConsoleCapture::reset`].
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use echolog::config::LoggingConfig;
//! use echolog::console::{Console, ConsoleCapture, ProcessHost};
//! use echolog::logging::TracingFileLogger;
//!
//! let console = Arc::new(Console::stdio());
//! let capture = ConsoleCapture::new(
//!     Arc::clone(&console),
//!     Arc::new(ProcessHost::new(LoggingConfig::default())),
//!     Arc::new(TracingFileLogger),
//! );
//! capture.enable_console_capture();
//! let _ = echolog::console_log!(console, "ready in %dms", 12);
//! ```

use std::io;
use std::sync::Arc;

use serde_json::Value;

use super::errors::contain_write_error;
use super::filter::{should_suppress_console_message, SubsystemFilter};
use super::format::format_console_args;
use super::host::ConsoleHost;
use super::settings::{resolve_console_settings, CachedSettings, ConsoleSettings, SettingsKey};
use super::state::StateStore;
use super::{Console, ConsoleFn, RawConsole};
use crate::config::LoggingConfig;
use crate::logging::{FileLogger, LogLevel};

/// Owner of the capture state for one `Console`
pub struct ConsoleCapture {
    console: Arc<Console>,
    host: Arc<dyn ConsoleHost>,
    logger: Arc<dyn FileLogger>,
    state: StateStore,
}

impl ConsoleCapture {
    /// Create an unpatched capture controller
    pub fn new(
        console: Arc<Console>,
        host: Arc<dyn ConsoleHost>,
        logger: Arc<dyn FileLogger>,
    ) -> Self {
        Self {
            console,
            host,
            logger,
            state: StateStore::default(),
        }
    }

    /// The console this controller patches
    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    /// The file logger console calls are forwarded to
    pub fn logger(&self) -> &Arc<dyn FileLogger> {
        &self.logger
    }

    /// The host supplying config, verbosity and the stderr stream
    pub fn host(&self) -> &Arc<dyn ConsoleHost> {
        &self.host
    }

    /// Whether the capture wrappers are installed
    pub fn is_patched(&self) -> bool {
        self.state.lock().patched
    }

    /// Whether re-emission is forced to stderr
    pub fn is_routed_to_stderr(&self) -> bool {
        self.state.force_to_stderr()
    }

    /// Install the capture wrappers. Calling this again while installed does
    /// nothing, so there is never more than one layer of wrapping.
    pub fn enable_console_capture(&self) {
        let mut state = self.state.lock();
        if state.patched {
            return;
        }

        let originals = self.console.snapshot();
        let wrappers =
            originals.map(|method, original| self.forward(method.level(), Arc::clone(original)));
        self.console.restore(wrappers);

        state.saved_originals = Some(RawConsole::from_slots(&originals));
        state.restore_slots = Some(originals);
        state.patched = true;
        drop(state);

        tracing::debug!(target: "echolog", "console capture installed");
    }

    /// Build the wrapper for one console function.
    ///
    /// The level and original function are captured by value here, so replacing
    /// the console slot later does not change where this wrapper forwards to.
    fn forward(&self, level: LogLevel, original: ConsoleFn) -> ConsoleFn {
        let logger = Arc::clone(&self.logger);
        let host = Arc::clone(&self.host);
        let state = self.state.clone();

        Arc::new(move |args: &[Value]| -> io::Result<()> {
            let formatted = format_console_args(args);
            if should_suppress_console_message(&formatted, host.is_verbose()) {
                return Ok(());
            }

            // Never block console output on logging failures
            let _ = logger.log(level.file_level(), &formatted);

            let result = if state.force_to_stderr() {
                host.write_stderr(&format!("{}\n", formatted))
            } else {
                original(args)
            };
            contain_write_error(result)
        })
    }

    /// Send all re-emitted console output to stderr, keeping stdout clean for
    /// machine-readable output
    pub fn route_logs_to_stderr(&self) {
        self.state.lock().force_to_stderr = true;
        tracing::debug!(target: "echolog", "console output routed to stderr");
    }

    /// Restrict console output to the given subsystem prefixes.
    ///
    /// Prefixes are trimmed and empty ones dropped; if none remain the filter
    /// is cleared and every subsystem is allowed.
    pub fn set_console_subsystem_filter<I, S>(&self, prefixes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filter = SubsystemFilter::from_prefixes(prefixes);
        tracing::debug!(
            target: "echolog",
            filter = ?filter.as_ref().map(SubsystemFilter::prefixes),
            "console subsystem filter updated"
        );
        self.state.lock().subsystem_filter = filter;
    }

    /// Allow every subsystem again
    pub fn clear_console_subsystem_filter(&self) {
        self.state.lock().subsystem_filter = None;
        tracing::debug!(target: "echolog", "console subsystem filter cleared");
    }

    /// Currently installed subsystem filter
    pub fn subsystem_filter(&self) -> Option<SubsystemFilter> {
        self.state.lock().subsystem_filter.clone()
    }

    /// Whether `subsystem` may write to the console under the current filter
    pub fn should_log_subsystem_to_console(&self, subsystem: &str) -> bool {
        match &self.state.lock().subsystem_filter {
            Some(filter) => filter.allows(subsystem),
            None => true,
        }
    }

    /// Effective console settings.
    ///
    /// Cached until the logging config or the verbose flag changes; while they
    /// are unchanged the terminal is not queried again.
    pub fn get_console_settings(&self) -> ConsoleSettings {
        let verbose = self.host.is_verbose();
        let override_settings = self.state.lock().override_settings.clone();
        let config = override_settings.unwrap_or_else(|| self.host.logging_config());
        let key = SettingsKey::new(&config, verbose);

        if let Some(cached) = &self.state.lock().cached_settings {
            if cached.key == key {
                return cached.settings;
            }
        }

        let settings =
            resolve_console_settings(&config, verbose, || self.host.stdout_is_terminal());
        self.state.lock().cached_settings = Some(CachedSettings { key, settings });
        settings
    }

    /// Use `settings` instead of the configured logging section; `None`
    /// returns to the configuration
    pub fn set_settings_override(&self, settings: Option<LoggingConfig>) {
        let mut state = self.state.lock();
        state.override_settings = settings;
        state.cached_settings = None;
    }

    /// The pre-capture log/info/warn/error functions, while capture is
    /// installed. Writes through these bypass interception.
    pub fn raw_console(&self) -> Option<RawConsole> {
        self.state.lock().saved_originals.clone()
    }

    /// Return to the unpatched state: put the original console functions back
    /// and clear stderr routing, the subsystem filter and cached settings.
    ///
    /// A settings override stays in place until replaced with
    /// [`set_settings_override`](Self::set_settings_override).
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if let Some(originals) = state.restore_slots.take() {
            self.console.restore(originals);
        }
        state.patched = false;
        state.force_to_stderr = false;
        state.saved_originals = None;
        state.subsystem_filter = None;
        state.cached_settings = None;
        drop(state);

        tracing::debug!(target: "echolog", "console capture reset");
    }
}
