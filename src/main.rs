use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use echolog::config::{self, Config};
use echolog::console::{Console, ConsoleCapture, ProcessHost, SubsystemLogger};
use echolog::globals;
use echolog::logging::{self, TracingFileLogger};

/// Echo stdin through a captured console, teeing every line into the log file
#[derive(Parser, Debug)]
#[command(name = "echolog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Show debug output and session lifecycle messages
    #[arg(short, long)]
    verbose: bool,

    /// Write console output to stderr, keeping stdout clean
    #[arg(long)]
    stderr: bool,

    /// Only show subsystem logs under these prefixes (comma separated)
    #[arg(long, value_delimiter = ',')]
    subsystems: Vec<String>,
}

/// Echo every line of `input` through `console.log`.
///
/// Invalid UTF-8 is replaced rather than ending the loop. Returns the number of
/// lines echoed once `input` reaches EOF.
fn echo_lines(mut input: impl BufRead, console: &Console) -> Result<usize> {
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("Failed to read stdin")?;
        if read == 0 {
            return Ok(count);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        if std::str::from_utf8(&buf).is_err() {
            tracing::warn!(
                line = count + 1,
                "stdin line is not valid UTF-8, replacing invalid bytes"
            );
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        console.log(&[Value::String(line)])?;
        count += 1;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure config directory exists (creates logs dir too)
    config::ensure_directories()?;
    let config = Config::load()?;
    globals::set_verbose(args.verbose);

    // Initialize file logging BEFORE any tracing calls
    let (log_file_info, _guard) = logging::init_file_logging(&config.logging)?;
    tracing::info!("Logging to: {}", log_file_info.path.display());

    let console = Arc::new(Console::stdio());
    let capture = Arc::new(ConsoleCapture::new(
        Arc::clone(&console),
        Arc::new(ProcessHost::new(config.logging.clone())),
        Arc::new(TracingFileLogger),
    ));
    if args.stderr {
        capture.route_logs_to_stderr();
    }
    if !args.subsystems.is_empty() {
        capture.set_console_subsystem_filter(&args.subsystems);
    }
    capture.enable_console_capture();

    let startup = SubsystemLogger::new("echolog", Arc::clone(&capture));
    startup.info(&format!("echoing stdin, log file {}", log_file_info.path.display()))?;

    let echoed = echo_lines(io::stdin().lock(), &console)?;

    tracing::info!(lines = echoed, "stdin closed, exiting");
    Ok(())
}
