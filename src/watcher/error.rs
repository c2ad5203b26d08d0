//! Error types for the file watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The underlying event source could not be created. Terminal for the
    /// watcher instance.
    #[error("Failed to initialize file watcher: {reason}")]
    Init { reason: String },

    /// The path could not be opened for event-only access. Local and
    /// recoverable; other watched paths are unaffected.
    #[error("Cannot open {path} for watching: {source}")]
    CannotOpenPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform source refused to register the path.
    #[error("Cannot register {path} with the event source: {reason}")]
    RegisterFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::Init {
            reason: e.to_string(),
        }
    }
}
