//! Console message filters
//!
//! Two independent filters: a fixed list of noisy message prefixes that are
//! dropped outright, and an optional subsystem allow-list consulted by callers
//! deciding whether a subsystem may write to the console at all.

/// Session lifecycle chatter that is dropped unless verbose mode is on
pub const SUPPRESSED_CONSOLE_PREFIXES: &[&str] = &[
    "Closing session:",
    "Opening session:",
    "Removing old closed session:",
    "Session already closed",
    "Session already open",
];

/// Whether a formatted console message should be dropped entirely
pub fn should_suppress_console_message(message: &str, verbose: bool) -> bool {
    if verbose {
        return false;
    }
    SUPPRESSED_CONSOLE_PREFIXES
        .iter()
        .any(|prefix| message.starts_with(prefix))
}

/// Allow-list of subsystem name prefixes
///
/// Never empty and never holds an empty entry; "allow everything" is
/// represented by having no filter at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemFilter {
    prefixes: Vec<String>,
}

impl SubsystemFilter {
    /// Build a filter from candidate prefixes.
    ///
    /// Entries are trimmed and empty ones dropped. Returns `None` when nothing
    /// is left, meaning every subsystem is allowed.
    pub fn from_prefixes<I, S>(prefixes: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if prefixes.is_empty() {
            None
        } else {
            Some(Self { prefixes })
        }
    }

    /// Installed prefixes, in the order given
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether `subsystem` is one of the prefixes or nested under one
    /// (`db` allows `db` and `db/reads` but not `dbx`)
    pub fn allows(&self, subsystem: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            subsystem
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}
