//! Registry of watched paths.
//!
//! Owns the path -> watch entry mapping for a watcher instance. The map is
//! internal to [`FileWatcher`](super::FileWatcher) and only ever touched
//! under its lock; nothing outside the watcher mutates it.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::event::ChangeKind;

/// One registered watch: the opened event-only handle and the active mask.
///
/// The handle is held only to keep the file open for the lifetime of the
/// watch; dropping the entry releases it.
#[derive(Debug)]
pub struct WatchedPath {
    pub mask: ChangeKind,
    _handle: File,
}

/// Mapping of watched paths with parent-directory bookkeeping.
///
/// A given path is registered at most once; re-registration updates the
/// mask in place instead of duplicating the entry. Parent directories are
/// tracked so the platform source watches each directory only once.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    entries: HashMap<PathBuf, WatchedPath>,
    watch_dirs: HashSet<PathBuf>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path, or update its mask if already present.
    ///
    /// Returns true if this created a new entry.
    pub fn register(&mut self, path: PathBuf, handle: File, mask: ChangeKind) -> bool {
        match self.entries.get_mut(&path) {
            Some(entry) => {
                entry.mask = mask;
                false
            }
            None => {
                self.entries.insert(
                    path,
                    WatchedPath {
                        mask,
                        _handle: handle,
                    },
                );
                true
            }
        }
    }

    /// Remove a path, releasing its handle. Returns false for unknown paths.
    pub fn remove(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Active mask for a path, if watched.
    pub fn mask(&self, path: &Path) -> Option<ChangeKind> {
        self.entries.get(path).map(|e| e.mask)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record the parent directory of a path, returning it if it was not
    /// already tracked and therefore needs a platform registration.
    ///
    /// Note: directories are never un-tracked on `remove`, as other watches
    /// may still have files there.
    pub fn track_parent(&mut self, path: &Path) -> Option<PathBuf> {
        let dir = Self::parent_dir(path);
        self.watch_dirs.insert(dir.clone()).then_some(dir)
    }

    /// Forget a tracked directory (rollback for a failed platform watch).
    pub fn untrack_dir(&mut self, dir: &Path) {
        self.watch_dirs.remove(dir);
    }

    /// Parent directory of a path, with root-level files mapping to ".".
    pub fn parent_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp(dir: &TempDir, name: &str) -> (PathBuf, File) {
        let path = dir.path().join(name);
        std::fs::write(&path, "").unwrap();
        (path.clone(), File::open(&path).unwrap())
    }

    #[test]
    fn test_register_once() {
        let dir = TempDir::new().unwrap();
        let (path, handle) = open_temp(&dir, "a.log");

        let mut registry = WatchRegistry::new();
        assert!(registry.register(path.clone(), handle, ChangeKind::DEFAULT));
        assert!(registry.contains(&path));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregister_updates_mask_without_duplicating() {
        let dir = TempDir::new().unwrap();
        let (path, h1) = open_temp(&dir, "a.log");
        let h2 = File::open(&path).unwrap();

        let mut registry = WatchRegistry::new();
        registry.register(path.clone(), h1, ChangeKind::DEFAULT);
        let created = registry.register(path.clone(), h2, ChangeKind::WRITE);

        assert!(!created);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.mask(&path), Some(ChangeKind::WRITE));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = WatchRegistry::new();
        assert!(!registry.remove(Path::new("/never/watched.log")));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_track_parent_deduplicates() {
        let mut registry = WatchRegistry::new();
        let first = registry.track_parent(Path::new("/logs/a.log"));
        let second = registry.track_parent(Path::new("/logs/b.log"));

        assert_eq!(first, Some(PathBuf::from("/logs")));
        assert_eq!(second, None);
    }

    #[test]
    fn test_parent_dir_of_bare_filename() {
        assert_eq!(
            WatchRegistry::parent_dir(Path::new("out.log")),
            PathBuf::from(".")
        );
    }
}
