//! Lint pipeline: watcher event -> re-read -> line delta -> verdicts.
//!
//! One pipeline instance guards one file. Collaborators (file reading,
//! reporting, process halt) are injected behind traits so the
//! violation-halts-the-process behavior is observable in tests instead of
//! actually terminating the test process.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::matcher::Whitelist;
use crate::tracker::{LineDelta, LineTracker};
use crate::watcher::{ChangeEvent, ChangeHandler, ChangeKind, FileWatcher, WatchError};

/// Classification of one newly appended line. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub line: String,
    pub allowed: bool,
}

/// Supplies the current full text of a file.
pub trait FileReader: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Production reader backed by the filesystem.
pub struct FsReader;

impl FileReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Receives verdicts, tracker anomalies, and read failures.
///
/// The violating line (or the read error) always reaches the report
/// before the abort capability fires.
pub trait LintReport: Send + Sync {
    fn verdict(&self, path: &Path, verdict: &Verdict);
    fn anomaly(&self, path: &Path, delta: &LineDelta);
    fn read_failure(&self, path: &Path, error: &io::Error);
}

/// Production report printing to stdout.
///
/// Must not write to stderr: that stream is redirected into the watched
/// file, and writing there would lint our own output.
pub struct ConsoleReport;

impl LintReport for ConsoleReport {
    fn verdict(&self, path: &Path, verdict: &Verdict) {
        if verdict.allowed {
            crate::debug_event!("lint", "whitelisted", "{}", verdict.line);
            return;
        }
        println!(
            "********** LOGLINT CAUGHT AN UNEXPECTED LOG **********\n\
             Please address the issue that caused this log, then re-run your application.\n\
             {} ({})",
            verdict.line,
            path.display()
        );
    }

    fn anomaly(&self, path: &Path, delta: &LineDelta) {
        tracing::warn!("[lint] {} in {}", delta.tag(), path.display());
    }

    fn read_failure(&self, path: &Path, error: &io::Error) {
        println!(
            "********** LOGLINT COULD NOT READ INTERCEPTED LOG **********\n\
             {}: {error}",
            path.display()
        );
    }
}

/// Injectable process-halt capability.
pub trait Abort: Send + Sync {
    fn abort(&self);
}

/// Production abort: terminates the process.
pub struct ProcessAbort;

impl Abort for ProcessAbort {
    fn abort(&self) {
        std::process::exit(1);
    }
}

/// Guards one file: reads it on change, diffs, and matches every new line.
///
/// State machine per file: empty baseline on construction, steady state
/// once the first snapshot lands. The read-observe-match sequence is
/// serialized per file by the watcher's FIFO delivery plus the tracker
/// lock; the baseline is never touched outside it.
pub struct LintPipeline {
    path: PathBuf,
    whitelist: Whitelist,
    tracker: Mutex<LineTracker>,
    reader: Box<dyn FileReader>,
    report: Box<dyn LintReport>,
    abort: Box<dyn Abort>,
    halted: AtomicBool,
}

impl LintPipeline {
    /// Pipeline with production collaborators.
    pub fn new(path: PathBuf, whitelist: Whitelist) -> Self {
        Self::with_collaborators(
            path,
            whitelist,
            Box::new(FsReader),
            Box::new(ConsoleReport),
            Box::new(ProcessAbort),
        )
    }

    pub fn with_collaborators(
        path: PathBuf,
        whitelist: Whitelist,
        reader: Box<dyn FileReader>,
        report: Box<dyn LintReport>,
        abort: Box<dyn Abort>,
    ) -> Self {
        Self {
            path,
            whitelist,
            tracker: Mutex::new(LineTracker::new()),
            reader,
            report,
            abort,
            halted: AtomicBool::new(false),
        }
    }

    /// Register this pipeline's file with a watcher.
    ///
    /// Interest covers all kinds, as the original registration did; the
    /// handler itself acts only on write-class events.
    pub fn register(&self, watcher: &FileWatcher) -> Result<(), WatchError> {
        watcher.watch(&self.path, ChangeKind::DEFAULT)
    }

    /// Whether a violation or read failure has already halted this pipeline.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Re-read the file and lint whatever was appended.
    pub fn poll(&self) {
        if self.is_halted() {
            return;
        }

        let content = match self.reader.read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                // A watched file going unreadable is terminal: the run must
                // not continue silently.
                self.report.read_failure(&self.path, &e);
                self.halt();
                return;
            }
        };

        let delta = self.tracker.lock().observe(&content);
        match delta {
            LineDelta::Appended(lines) => {
                for line in lines {
                    let allowed = self.whitelist.is_allowed(&line);
                    let verdict = Verdict { line, allowed };
                    self.report.verdict(&self.path, &verdict);
                    if !allowed {
                        self.halt();
                        return;
                    }
                }
            }
            anomaly => {
                // Tracking inconsistency, not a content violation: report
                // and keep watching.
                self.report.anomaly(&self.path, &anomaly);
            }
        }
    }

    /// Fire the abort capability exactly once.
    fn halt(&self) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            self.abort.abort();
        }
    }
}

impl ChangeHandler for LintPipeline {
    fn on_change(&self, event: ChangeEvent) {
        if !event.kinds.intersects(ChangeKind::WRITE) {
            return;
        }
        self.poll();
    }
}
