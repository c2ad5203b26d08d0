//! Crate-level error type.

use std::path::PathBuf;
use thiserror::Error;

use crate::watcher::WatchError;

/// Errors from setting up or running the linter.
#[derive(Error, Debug)]
pub enum LintError {
    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Cannot create intercepted log file {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot redirect stderr: {reason}")]
    Redirect { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
