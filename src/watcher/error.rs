//! Error types for the watch subsystem.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watch registration and polling.
///
/// Nothing here is fatal to the cache: registration failures leave a single
/// directory unwatched and backend failures degrade to a never-updating
/// watch. Callers log these and continue.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to initialize watch backend: {reason}")]
    InitFailed { reason: String },

    #[error("cannot watch directory {path}: {reason}")]
    RegistrationFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
