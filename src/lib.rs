//! loglint: development-time log integrity guard.
//!
//! Intercepts a process's diagnostic output, observes it line-by-line as it
//! is appended to a file, and halts the process the moment a new line fails
//! to match an allow-list of expected patterns.
//!
//! # Data flow
//!
//! ```text
//! filesystem write
//!   -> FileWatcher event (per-path FIFO dispatch)
//!   -> LintPipeline re-reads the file
//!   -> LineTracker emits the appended lines (or an anomaly)
//!   -> Whitelist classifies each line
//!   -> allowed: continue | violated: report, then halt
//! ```

pub mod config;
pub mod error;
pub mod linter;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod redirect;
pub mod tracker;
pub mod watcher;

pub use config::Settings;
pub use error::LintError;
pub use linter::LogLinter;
pub use matcher::{Whitelist, WhitelistPattern};
pub use pipeline::{Abort, FileReader, LintPipeline, LintReport, Verdict};
pub use tracker::{LineDelta, LineTracker, diff_lines};
pub use watcher::{ChangeEvent, ChangeHandler, ChangeKind, FileWatcher, WatchError};
