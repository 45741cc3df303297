//! Subsystem-tagged logger
//!
//! Writes go to the file logger unconditionally and to the console only when
//! the level passes the console threshold and the subsystem passes the
//! allow-list. Console lines bypass the capture wrappers so they are not
//! recorded twice.

use std::io;
use std::sync::Arc;

use chrono::Local;
use crossterm::style::Stylize;
use serde_json::{json, Value};

use super::capture::ConsoleCapture;
use super::errors::contain_write_error;
use super::settings::ConsoleStyle;
use super::ConsoleMethod;
use crate::logging::LogLevel;

/// Logger bound to one subsystem name, such as `gateway` or `db/reads`
#[derive(Clone)]
pub struct SubsystemLogger {
    subsystem: String,
    capture: Arc<ConsoleCapture>,
}

impl SubsystemLogger {
    pub fn new(subsystem: impl Into<String>, capture: Arc<ConsoleCapture>) -> Self {
        Self {
            subsystem: subsystem.into(),
            capture,
        }
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Log `message` at `level`.
    ///
    /// Only non-pipe write failures on the console destination are returned.
    pub fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        let tagged = format!("[{}] {}", self.subsystem, message);
        let _ = self.capture.logger().log(level.file_level(), &tagged);

        let settings = self.capture.get_console_settings();
        if level < settings.level || !self.capture.should_log_subsystem_to_console(&self.subsystem)
        {
            return Ok(());
        }

        let line = self.render(level, message, settings.style);
        contain_write_error(self.emit(level, line))
    }

    pub fn trace(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Error, message)
    }

    fn render(&self, level: LogLevel, message: &str, style: ConsoleStyle) -> String {
        match style {
            ConsoleStyle::Compact => format!("[{}] {}", self.subsystem, message),
            ConsoleStyle::Json => json!({
                "time": Local::now().to_rfc3339(),
                "level": level.as_str(),
                "subsystem": self.subsystem,
                "message": message,
            })
            .to_string(),
            ConsoleStyle::Pretty => {
                let time = Local::now().format("%H:%M:%S").to_string();
                let tag = format!("[{}]", self.subsystem);
                let label = format!("{:<5}", level.as_str());
                let label = match level {
                    LogLevel::Trace | LogLevel::Debug => label.dark_grey(),
                    LogLevel::Info => label.green(),
                    LogLevel::Warn => label.yellow(),
                    LogLevel::Error | LogLevel::Fatal => label.red().bold(),
                };
                format!("{} {} {} {}", time.dark_grey(), label, tag.cyan(), message)
            }
        }
    }

    /// Write straight to the destination the capture wrappers would have used
    fn emit(&self, level: LogLevel, line: String) -> io::Result<()> {
        if self.capture.is_routed_to_stderr() {
            return self.capture.host().write_stderr(&format!("{}\n", line));
        }

        let args = [Value::String(line)];
        match self.capture.raw_console() {
            Some(raw) => (raw.for_level(level))(&args),
            None => {
                let method = match level {
                    LogLevel::Error | LogLevel::Fatal => ConsoleMethod::Error,
                    LogLevel::Warn => ConsoleMethod::Warn,
                    _ => ConsoleMethod::Log,
                };
                self.capture.console().call(method, &args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use crate::console::host::ConsoleHost;
    use crate::console::testing::{
        failing_fn, journaling_slots, FakeHost, FakeLogger, Failure, Journal,
    };
    use crate::console::Console;
    use crate::logging::FileLogger;
    use std::sync::Mutex;

    struct Fixture {
        journal: Journal,
        console: Arc<Console>,
        host: Arc<FakeHost>,
        logger: Arc<FakeLogger>,
        capture: Arc<ConsoleCapture>,
    }

    impl Fixture {
        fn new(style: &str) -> Self {
            let journal: Journal = Arc::new(Mutex::new(Vec::new()));
            let console = Arc::new(Console::new(journaling_slots(&journal)));
            let host = Arc::new(FakeHost::new(&journal));
            let logger = Arc::new(FakeLogger::new(&journal));
            let capture = Arc::new(ConsoleCapture::new(
                Arc::clone(&console),
                Arc::clone(&host) as Arc<dyn ConsoleHost>,
                Arc::clone(&logger) as Arc<dyn FileLogger>,
            ));
            capture.set_settings_override(Some(LoggingConfig {
                console_style: Some(style.to_string()),
                ..LoggingConfig::default()
            }));
            Self {
                journal,
                console,
                host,
                logger,
                capture,
            }
        }

        fn logger(&self, subsystem: &str) -> SubsystemLogger {
            SubsystemLogger::new(subsystem, Arc::clone(&self.capture))
        }

        fn console_entries(&self) -> Vec<String> {
            self.journal
                .lock()
                .unwrap()
                .iter()
                .filter(|e| !e.starts_with("file:"))
                .cloned()
                .collect()
        }
    }

    #[test]
    fn test_compact_line_through_console() {
        let fx = Fixture::new("compact");
        fx.logger("gateway").info("listening on 8080").unwrap();

        assert_eq!(
            fx.logger.lines(),
            vec![(LogLevel::Info, "[gateway] listening on 8080".to_string())]
        );
        assert_eq!(
            fx.console_entries(),
            vec!["log:[gateway] listening on 8080#1".to_string()]
        );
    }

    #[test]
    fn test_levels_pick_console_slot() {
        let fx = Fixture::new("compact");
        let log = fx.logger("db");
        log.warn("slow").unwrap();
        log.error("down").unwrap();

        assert_eq!(
            fx.console_entries(),
            vec!["warn:[db] slow#1".to_string(), "error:[db] down#1".to_string()]
        );
    }

    #[test]
    fn test_below_threshold_only_reaches_file() {
        let fx = Fixture::new("compact");
        fx.logger("db").debug("query plan").unwrap();

        assert_eq!(fx.logger.lines().len(), 1);
        assert!(fx.console_entries().is_empty());
    }

    #[test]
    fn test_verbose_lowers_threshold() {
        let fx = Fixture::new("compact");
        fx.host.set_verbose(true);
        fx.logger("db").debug("query plan").unwrap();

        assert_eq!(fx.console_entries(), vec!["log:[db] query plan#1".to_string()]);
    }

    #[test]
    fn test_filtered_subsystem_only_reaches_file() {
        let fx = Fixture::new("compact");
        fx.capture.set_console_subsystem_filter(["db"]);

        fx.logger("dbx").info("hidden").unwrap();
        fx.logger("db/reads").info("shown").unwrap();

        assert_eq!(fx.logger.lines().len(), 2);
        assert_eq!(
            fx.console_entries(),
            vec!["log:[db/reads] shown#1".to_string()]
        );
    }

    #[test]
    fn test_bypasses_capture_when_patched() {
        let fx = Fixture::new("compact");
        fx.capture.enable_console_capture();

        fx.logger("gateway").info("up").unwrap();

        // Recorded once by the file logger, not a second time by the wrapper
        assert_eq!(fx.logger.lines().len(), 1);
        assert_eq!(fx.console_entries(), vec!["log:[gateway] up#1".to_string()]);
    }

    #[test]
    fn test_stderr_routing() {
        let fx = Fixture::new("compact");
        fx.capture.route_logs_to_stderr();

        fx.logger("gateway").error("boom").unwrap();

        assert_eq!(fx.host.stderr_text(), "[gateway] boom\n");
        assert_eq!(
            fx.console_entries(),
            vec!["stderr:[gateway] boom\n".to_string()]
        );
    }

    #[test]
    fn test_json_line() {
        let fx = Fixture::new("json");
        fx.logger("gateway").warn("retrying").unwrap();

        let entries = fx.console_entries();
        let line = entries[0]
            .strip_prefix("warn:")
            .and_then(|s| s.strip_suffix("#1"))
            .unwrap();
        let parsed: Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["subsystem"], "gateway");
        assert_eq!(parsed["message"], "retrying");
        assert!(parsed["time"].is_string());
    }

    #[test]
    fn test_pretty_line_contains_tag_and_message() {
        let fx = Fixture::new("pretty");
        fx.logger("gateway").info("ready").unwrap();

        let entries = fx.console_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("[gateway]"));
        assert!(entries[0].ends_with("ready#1"));
    }

    #[test]
    fn test_broken_console_is_swallowed() {
        let fx = Fixture::new("compact");
        fx.console
            .set(ConsoleMethod::Log, failing_fn(Failure::BrokenPipe));

        assert!(fx.logger("gateway").info("lost").is_ok());
        assert_eq!(fx.logger.lines().len(), 1);
    }

    #[test]
    fn test_other_console_errors_propagate() {
        let fx = Fixture::new("compact");
        fx.console
            .set(ConsoleMethod::Error, failing_fn(Failure::PermissionDenied));

        let err = fx.logger("gateway").error("lost").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
