//! Process-wide runtime flags

use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Turn verbose mode on or off
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

/// Whether verbose mode is on
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}
