//! FileWatcher integration tests against a real filesystem.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use loglint::watcher::{ChangeEvent, ChangeHandler, ChangeKind, FileWatcher, WatchError};

const POLL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct Collector {
    events: Mutex<Vec<ChangeEvent>>,
}

impl ChangeHandler for Collector {
    fn on_change(&self, event: ChangeEvent) {
        self.events.lock().push(event);
    }
}

impl Collector {
    fn count(&self) -> usize {
        self.events.lock().len()
    }
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

fn create(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, "").unwrap();
    path
}

/// Poll until `cond` holds or the deadline passes.
fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    cond()
}

#[test]
fn test_write_event_is_delivered() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = create(&dir, "a.log");

    let collector = Arc::new(Collector::default());
    let watcher = FileWatcher::with_poll_timeout(collector.clone(), POLL).unwrap();
    watcher.watch(&path, ChangeKind::DEFAULT).unwrap();

    append(&path, "hello\n");

    assert!(
        wait_until(Duration::from_secs(5), || collector.count() > 0),
        "no event delivered within timeout"
    );

    let events = collector.events.lock();
    let canonical = path.canonicalize().unwrap();
    assert!(events.iter().all(|e| e.path == canonical));
    assert!(
        events.iter().any(|e| e.kinds.intersects(ChangeKind::WRITE)),
        "expected at least one write-kind event, got {events:?}"
    );
}

#[test]
fn test_rewatch_updates_mask_without_duplicate() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = create(&dir, "a.log");

    let watcher = FileWatcher::with_poll_timeout(Arc::new(Collector::default()), POLL).unwrap();
    watcher.watch(&path, ChangeKind::DEFAULT).unwrap();
    watcher.watch(&path, ChangeKind::WRITE).unwrap();

    assert_eq!(watcher.watched_count(), 1);
    assert_eq!(watcher.mask(&path), Some(ChangeKind::WRITE));
}

#[test]
fn test_watch_missing_path_is_recoverable() {
    let dir = tempfile::TempDir::new().unwrap();
    let present = create(&dir, "a.log");
    let missing = dir.path().join("missing.log");

    let watcher = FileWatcher::with_poll_timeout(Arc::new(Collector::default()), POLL).unwrap();

    let err = watcher.watch(&missing, ChangeKind::DEFAULT).unwrap_err();
    assert!(matches!(err, WatchError::CannotOpenPath { .. }));

    // Other watches are unaffected by the local failure.
    watcher.watch(&present, ChangeKind::DEFAULT).unwrap();
    assert_eq!(watcher.watched_count(), 1);
}

#[test]
fn test_unwatch_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = create(&dir, "a.log");

    let watcher = FileWatcher::with_poll_timeout(Arc::new(Collector::default()), POLL).unwrap();

    // Never-watched path: no-op, no panic.
    watcher.unwatch(&path);
    watcher.unwatch(Path::new("/never/watched.log"));

    watcher.watch(&path, ChangeKind::DEFAULT).unwrap();
    assert!(watcher.is_watched(&path));

    watcher.unwatch(&path);
    assert!(!watcher.is_watched(&path));
    assert_eq!(watcher.watched_count(), 0);

    // Already-unwatched path: still a no-op.
    watcher.unwatch(&path);
    assert_eq!(watcher.watched_count(), 0);
}

#[test]
fn test_events_only_for_registered_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let watched = create(&dir, "watched.log");
    let ignored = create(&dir, "ignored.log");

    let collector = Arc::new(Collector::default());
    let watcher = FileWatcher::with_poll_timeout(collector.clone(), POLL).unwrap();
    watcher.watch(&watched, ChangeKind::DEFAULT).unwrap();

    // Same directory, unregistered file.
    append(&ignored, "noise\n");
    append(&watched, "signal\n");

    assert!(wait_until(Duration::from_secs(5), || collector.count() > 0));

    let canonical = watched.canonicalize().unwrap();
    assert!(collector.events.lock().iter().all(|e| e.path == canonical));
}

#[test]
fn test_two_files_both_receive_events() {
    let dir = tempfile::TempDir::new().unwrap();
    let a = create(&dir, "a.log");
    let b = create(&dir, "b.log");

    let collector = Arc::new(Collector::default());
    let watcher = FileWatcher::with_poll_timeout(collector.clone(), POLL).unwrap();
    watcher.watch(&a, ChangeKind::DEFAULT).unwrap();
    watcher.watch(&b, ChangeKind::DEFAULT).unwrap();
    assert_eq!(watcher.watched_count(), 2);

    append(&a, "one\n");
    append(&b, "two\n");

    let (ca, cb) = (a.canonicalize().unwrap(), b.canonicalize().unwrap());
    assert!(wait_until(Duration::from_secs(5), || {
        let events = collector.events.lock();
        events.iter().any(|e| e.path == ca) && events.iter().any(|e| e.path == cb)
    }));
}

#[test]
fn test_watch_after_shutdown_restarts_delivery() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = create(&dir, "a.log");

    let collector = Arc::new(Collector::default());
    let watcher = FileWatcher::with_poll_timeout(collector.clone(), POLL).unwrap();
    watcher.watch(&path, ChangeKind::DEFAULT).unwrap();
    watcher.shutdown();

    // A new watch brings the poll loop and a fresh worker back up.
    watcher.watch(&path, ChangeKind::DEFAULT).unwrap();
    let seen = collector.count();
    append(&path, "back again\n");

    assert!(
        wait_until(Duration::from_secs(5), || collector.count() > seen),
        "no event delivered after restart"
    );
}

#[test]
fn test_no_delivery_after_shutdown() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = create(&dir, "a.log");

    let collector = Arc::new(Collector::default());
    let watcher = FileWatcher::with_poll_timeout(collector.clone(), POLL).unwrap();
    watcher.watch(&path, ChangeKind::DEFAULT).unwrap();

    watcher.shutdown();
    assert_eq!(watcher.watched_count(), 0);

    let seen = collector.count();
    append(&path, "after shutdown\n");
    std::thread::sleep(Duration::from_millis(300));

    assert_eq!(collector.count(), seen, "handler ran after teardown");
}
