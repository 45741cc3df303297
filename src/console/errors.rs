//! Classification of console write failures

use std::io;

/// Categories of output-stream write errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationErrorKind {
    /// The reader on the other end went away (closed pipe)
    BrokenPipe,
    /// Generic I/O fault on the stream (e.g. a vanished terminal or device)
    IoFault,
    /// Anything else
    Other,
}

impl DestinationErrorKind {
    /// Whether the destination can no longer accept data
    pub fn is_broken_destination(&self) -> bool {
        matches!(
            self,
            DestinationErrorKind::BrokenPipe | DestinationErrorKind::IoFault
        )
    }
}

/// Categorize an error returned by a console write
pub fn categorize_write_error(e: &io::Error) -> DestinationErrorKind {
    if e.kind() == io::ErrorKind::BrokenPipe {
        return DestinationErrorKind::BrokenPipe;
    }

    #[cfg(unix)]
    {
        match e.raw_os_error() {
            Some(libc::EPIPE) => return DestinationErrorKind::BrokenPipe,
            Some(libc::EIO) => return DestinationErrorKind::IoFault,
            _ => {}
        }
    }

    DestinationErrorKind::Other
}

/// Whether a write error means the destination is gone and should be ignored
pub fn is_broken_destination(e: &io::Error) -> bool {
    categorize_write_error(e).is_broken_destination()
}

/// Discard broken-destination errors, keep everything else
pub(crate) fn contain_write_error(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if is_broken_destination(&e) => Ok(()),
        other => other,
    }
}
