//! Top-level wiring: intercepted log file, stderr capture, pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::Settings;
use crate::error::LintError;
use crate::matcher::Whitelist;
use crate::pipeline::LintPipeline;
use crate::redirect::redirect_stderr;
use crate::watcher::{ChangeHandler, FileWatcher};

/// A running log linter: a watcher, a pipeline, and the file they guard.
///
/// Dropping the linter tears the watcher down; no verdicts are produced
/// afterwards. Stderr redirection (hijack mode) is not undone.
pub struct LogLinter {
    watcher: FileWatcher,
    pipeline: Arc<LintPipeline>,
    log_path: PathBuf,
}

impl LogLinter {
    /// Hijack mode, the original use case: create a fresh intercepted log
    /// file, redirect this process's stderr into it, and lint everything
    /// that arrives.
    pub fn start(settings: &Settings) -> Result<Self, LintError> {
        let dir = resolve_log_dir(settings);
        std::fs::create_dir_all(&dir)?;
        let log_path = dir.join(format!("hijacked_output_{}.log", Uuid::new_v4()));

        std::fs::write(&log_path, "").map_err(|e| LintError::CreateLogFile {
            path: log_path.clone(),
            source: e,
        })?;

        println!(
            "********** LOGLINT ENABLED **********\n\
             Redirecting stderr to observed file at {}",
            log_path.display()
        );

        let linter = Self::attach(log_path.clone(), settings)?;
        redirect_stderr(&log_path)?;
        Ok(linter)
    }

    /// Watch an already-existing log file, without touching stderr.
    pub fn attach(log_path: PathBuf, settings: &Settings) -> Result<Self, LintError> {
        let pipeline = Arc::new(LintPipeline::new(
            log_path.clone(),
            Whitelist::new(&settings.whitelist),
        ));

        let handler: Arc<dyn ChangeHandler> = pipeline.clone();
        let watcher = FileWatcher::with_poll_timeout(
            handler,
            Duration::from_millis(settings.watch.poll_timeout_ms),
        )?;
        pipeline.register(&watcher)?;

        crate::log_event!("lint", "guarding", "{}", log_path.display());
        Ok(Self {
            watcher,
            pipeline,
            log_path,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn pipeline(&self) -> &Arc<LintPipeline> {
        &self.pipeline
    }

    pub fn watcher(&self) -> &FileWatcher {
        &self.watcher
    }
}

/// Writable directory for intercepted log files: configured dir, else the
/// user's local data dir, else the system temp dir.
fn resolve_log_dir(settings: &Settings) -> PathBuf {
    settings
        .log_dir
        .clone()
        .or_else(|| dirs::data_local_dir().map(|d| d.join("loglint")))
        .unwrap_or_else(std::env::temp_dir)
}
