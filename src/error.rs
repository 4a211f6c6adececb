//! Error types for operations that can fail recoverably.
//!
//! Contract violations (a relative pid file path, a non-positive pid) are
//! asserted, not returned; only OS-level failures surface as [`Error`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required system call failed.
    #[error("{call} failed: {source}")]
    System {
        call: &'static str,
        source: io::Error,
    },

    /// Publishing the pid file failed; the destination was left untouched.
    #[error("cannot write pid file {}: {source}", .path.display())]
    PidFile { path: PathBuf, source: io::Error },
}

impl Error {
    /// Captures `errno` for the system call that just failed.
    pub(crate) fn system(call: &'static str) -> Self {
        Error::System {
            call,
            source: io::Error::last_os_error(),
        }
    }
}
