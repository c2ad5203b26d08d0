//! File watcher: one platform event source, one poll thread, per-path
//! dispatch queues.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use notify::{Event, RecursiveMode, Watcher};
use parking_lot::Mutex;

use super::error::WatchError;
use super::event::{ChangeEvent, ChangeKind};
use super::registry::WatchRegistry;

/// How long the poll loop blocks on the event source before re-checking
/// the shutdown flag.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Receiver of change events for watched files.
///
/// Invoked on a per-path worker thread, never on the poll thread, so a
/// slow handler cannot stall delivery for other files. Calls for the same
/// path arrive one at a time, in notification order.
pub trait ChangeHandler: Send + Sync {
    fn on_change(&self, event: ChangeEvent);
}

/// Single-consumer queue feeding one path's worker thread.
///
/// One queue per watched path is what upholds the FIFO-per-path contract:
/// the poll loop enqueues fire-and-forget, the worker drains in order.
struct Dispatcher {
    tx: Sender<ChangeEvent>,
    worker: Option<JoinHandle<()>>,
}

/// State shared between the watcher handle, the poll thread, and workers.
struct Shared {
    registry: Mutex<WatchRegistry>,
    dispatchers: Mutex<HashMap<PathBuf, Dispatcher>>,
    handler: Arc<dyn ChangeHandler>,
    running: AtomicBool,
}

/// Watches a set of files and delivers [`ChangeEvent`]s to a handler.
///
/// Wraps a single `notify::RecommendedWatcher`. Parent directories are
/// registered non-recursively with the platform source; events are matched
/// back to watched files and filtered by each file's registered mask. The
/// first successful [`watch`](Self::watch) starts exactly one background
/// poll thread, reused by every later watch.
pub struct FileWatcher {
    shared: Arc<Shared>,
    source: Mutex<notify::RecommendedWatcher>,
    events: Receiver<notify::Result<Event>>,
    poll_thread: Mutex<Option<JoinHandle<()>>>,
    poll_timeout: Duration,
}

impl FileWatcher {
    /// Create a watcher delivering events to `handler`.
    ///
    /// Failure to construct the platform event source is terminal: there is
    /// no watcher instance to recover.
    pub fn new(handler: Arc<dyn ChangeHandler>) -> Result<Self, WatchError> {
        Self::with_poll_timeout(handler, DEFAULT_POLL_TIMEOUT)
    }

    /// Create a watcher with a custom poll timeout (shutdown latency bound).
    pub fn with_poll_timeout(
        handler: Arc<dyn ChangeHandler>,
        poll_timeout: Duration,
    ) -> Result<Self, WatchError> {
        let (tx, rx) = unbounded();
        let source = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        Ok(Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(WatchRegistry::new()),
                dispatchers: Mutex::new(HashMap::new()),
                handler,
                running: AtomicBool::new(false),
            }),
            source: Mutex::new(source),
            events: rx,
            poll_thread: Mutex::new(None),
            poll_timeout,
        })
    }

    /// Watch `path`, notifying the handler about the kinds in `mask`.
    ///
    /// The path must already exist; it is opened for event-only access and
    /// the handle held until unwatch or teardown. Re-watching an active
    /// path updates its mask in place and is otherwise a no-op.
    pub fn watch(&self, path: &Path, mask: ChangeKind) -> Result<(), WatchError> {
        let handle = File::open(path).map_err(|e| WatchError::CannotOpenPath {
            path: path.to_path_buf(),
            source: e,
        })?;
        let path = path
            .canonicalize()
            .map_err(|e| WatchError::CannotOpenPath {
                path: path.to_path_buf(),
                source: e,
            })?;

        let new_dir = {
            let mut registry = self.shared.registry.lock();
            if !registry.register(path.clone(), handle, mask) {
                crate::debug_event!("watcher", "mask updated", "{}", path.display());
                return Ok(());
            }
            registry.track_parent(&path)
        };

        if let Some(dir) = new_dir {
            if let Err(e) = self.source.lock().watch(&dir, RecursiveMode::NonRecursive) {
                let mut registry = self.shared.registry.lock();
                registry.remove(&path);
                registry.untrack_dir(&dir);
                return Err(WatchError::RegisterFailed {
                    path,
                    reason: e.to_string(),
                });
            }
            crate::debug_event!("watcher", "watching dir", "{}", dir.display());
        }

        if let Err(e) = self.spawn_worker(path.clone()) {
            self.shared.registry.lock().remove(&path);
            return Err(e);
        }
        if let Err(e) = self.ensure_poll_loop() {
            self.shared.registry.lock().remove(&path);
            self.shared.dispatchers.lock().remove(&path);
            return Err(e);
        }
        crate::log_event!("watcher", "watching", "{}", path.display());
        Ok(())
    }

    /// Stop watching `path`, releasing its handle and dispatch queue.
    ///
    /// Idempotent: unwatching a path that is not watched is a no-op.
    pub fn unwatch(&self, path: &Path) {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if self.shared.registry.lock().remove(&path) {
            crate::log_event!("watcher", "unwatched", "{}", path.display());
        }
        // Dropping the dispatcher closes the queue; the worker drains what
        // was already enqueued and exits on its own.
        self.shared.dispatchers.lock().remove(&path);
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.shared.registry.lock().contains(&path)
    }

    pub fn watched_count(&self) -> usize {
        self.shared.registry.lock().len()
    }

    /// Active mask for a watched path.
    pub fn mask(&self, path: &Path) -> Option<ChangeKind> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.shared.registry.lock().mask(&path)
    }

    /// Stop the poll loop and all workers, then release every watch.
    ///
    /// No handler invocation begins after this returns. Called from `Drop`;
    /// safe to call more than once.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.poll_thread.lock().take() {
            let _ = handle.join();
        }

        let dispatchers = std::mem::take(&mut *self.shared.dispatchers.lock());
        for (_, mut dispatcher) in dispatchers {
            drop(dispatcher.tx);
            if let Some(worker) = dispatcher.worker.take() {
                let _ = worker.join();
            }
        }

        *self.shared.registry.lock() = WatchRegistry::new();
    }

    fn spawn_worker(&self, path: PathBuf) -> Result<(), WatchError> {
        let mut dispatchers = self.shared.dispatchers.lock();
        if dispatchers.contains_key(&path) {
            return Ok(());
        }

        let (tx, rx) = unbounded::<ChangeEvent>();
        let shared = Arc::clone(&self.shared);
        let worker = thread::Builder::new()
            .name("loglint-dispatch".to_string())
            .spawn(move || {
                for event in rx {
                    if !shared.running.load(Ordering::SeqCst) {
                        break;
                    }
                    shared.handler.on_change(event);
                }
            })
            .map_err(|e| WatchError::Init {
                reason: format!("cannot spawn dispatch worker: {e}"),
            })?;

        dispatchers.insert(
            path,
            Dispatcher {
                tx,
                worker: Some(worker),
            },
        );
        Ok(())
    }

    fn ensure_poll_loop(&self) -> Result<(), WatchError> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let rx = self.events.clone();
        let shared = Arc::clone(&self.shared);
        let timeout = self.poll_timeout;
        match thread::Builder::new()
            .name("loglint-poll".to_string())
            .spawn(move || poll_loop(shared, rx, timeout))
        {
            Ok(handle) => {
                *self.poll_thread.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                // Leave the watcher stopped rather than claiming a loop
                // that does not exist.
                self.shared.running.store(false, Ordering::SeqCst);
                Err(WatchError::Init {
                    reason: format!("cannot spawn poll thread: {e}"),
                })
            }
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Blocking poll-and-dispatch loop.
///
/// Blocks on the event source with a bounded timeout so shutdown is never
/// delayed by a quiet filesystem. Dispatch is fire-and-forget: events go
/// onto the path's queue and the loop moves on without waiting for the
/// handler.
fn poll_loop(shared: Arc<Shared>, rx: Receiver<notify::Result<Event>>, timeout: Duration) {
    while shared.running.load(Ordering::SeqCst) {
        let event = match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                tracing::warn!("[watcher] event source error: {e}");
                continue;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let kinds = ChangeKind::from_notify(&event.kind);
        if kinds.is_empty() {
            continue;
        }

        for path in event.paths {
            let mask = shared.registry.lock().mask(&path);
            let Some(mask) = mask else {
                crate::debug_event!("watcher", "unmatched", "{}", path.display());
                continue;
            };
            if !mask.intersects(kinds) {
                continue;
            }

            if let Some(dispatcher) = shared.dispatchers.lock().get(&path) {
                let _ = dispatcher.tx.send(ChangeEvent { path, kinds });
            }
        }
    }
}
