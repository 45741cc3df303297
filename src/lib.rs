//! Echolog - console capture that tees leveled console output into a file log
//!
//! This library provides the replaceable `Console`, the `ConsoleCapture`
//! controller and the file logging it forwards to.

pub mod config;
pub mod console;
pub mod globals;
pub mod logging;

#[doc(hidden)]
pub use serde_json;
