//! Capture state store
//!
//! One `CaptureState` per `ConsoleCapture`, shared with the installed wrappers.
//! Each operation mutates it by assigning fields directly under the lock.

use std::sync::{Arc, Mutex, MutexGuard};

use super::filter::SubsystemFilter;
use super::settings::CachedSettings;
use super::{ConsoleSlots, RawConsole};
use crate::config::LoggingConfig;

#[derive(Default)]
pub(crate) struct CaptureState {
    /// Wrappers are installed on the console
    pub patched: bool,
    /// Re-emit to stderr instead of the original function
    pub force_to_stderr: bool,
    /// Pre-capture log/info/warn/error, for deliberate bypass writes
    pub saved_originals: Option<RawConsole>,
    /// All six pre-capture functions, restored on reset
    pub restore_slots: Option<ConsoleSlots>,
    /// Subsystem allow-list; `None` allows everything
    pub subsystem_filter: Option<SubsystemFilter>,
    pub cached_settings: Option<CachedSettings>,
    /// Replaces the configured logging section when set
    pub override_settings: Option<LoggingConfig>,
}

/// Shared handle to a `CaptureState`
#[derive(Clone, Default)]
pub(crate) struct StateStore {
    inner: Arc<Mutex<CaptureState>>,
}

impl StateStore {
    /// Lock the state. A poisoned lock is recovered since every write is a
    /// plain field assignment.
    pub fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn force_to_stderr(&self) -> bool {
        self.lock().force_to_stderr
    }
}
