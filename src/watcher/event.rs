//! Change events and the notification kind bitset.

use std::path::PathBuf;

use bitflags::bitflags;
use notify::EventKind;
use notify::event::{AccessKind, AccessMode, DataChange, ModifyKind};

bitflags! {
    /// Kinds of file change a watch can register interest in.
    ///
    /// A single notification can carry several kinds at once (a write that
    /// grows the file reports `WRITE | SIZE_INCREASE`), so the set is a
    /// bitset rather than an enum.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeKind: u32 {
        const WRITE          = 1 << 0;
        const RENAME         = 1 << 1;
        const DELETE         = 1 << 2;
        const ATTRIBUTE      = 1 << 3;
        const SIZE_INCREASE  = 1 << 4;
        const LINK_COUNT     = 1 << 5;
        const REVOKE         = 1 << 6;
        const UNLOCK         = 1 << 7;
        const DATA_AVAILABLE = 1 << 8;
    }
}

impl ChangeKind {
    /// Default registration mask: interested in everything.
    pub const DEFAULT: ChangeKind = ChangeKind::all();

    /// Map a notify event kind onto the bitset.
    ///
    /// Not every platform backend reports link-count, revocation, or
    /// unlock changes; those bits only fire on backends that surface them.
    pub fn from_notify(kind: &EventKind) -> ChangeKind {
        match kind {
            EventKind::Create(_) => ChangeKind::WRITE | ChangeKind::SIZE_INCREASE,
            EventKind::Modify(ModifyKind::Data(DataChange::Size)) => {
                ChangeKind::WRITE | ChangeKind::SIZE_INCREASE
            }
            EventKind::Modify(ModifyKind::Data(_)) => ChangeKind::WRITE,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::ATTRIBUTE,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::RENAME,
            EventKind::Modify(_) => ChangeKind::WRITE,
            EventKind::Remove(_) => ChangeKind::DELETE,
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => ChangeKind::WRITE,
            EventKind::Access(_) => ChangeKind::empty(),
            EventKind::Any | EventKind::Other => ChangeKind::DATA_AVAILABLE,
        }
    }
}

/// One observed change to a watched file.
///
/// Produced by the watcher's poll loop, consumed exactly once by the
/// registered handler. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kinds: ChangeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_maps_to_write_bit() {
        let kinds =
            ChangeKind::from_notify(&EventKind::Modify(ModifyKind::Data(DataChange::Content)));
        assert!(kinds.contains(ChangeKind::WRITE));
        assert!(!kinds.contains(ChangeKind::DELETE));
    }

    #[test]
    fn test_size_change_sets_both_bits() {
        let kinds = ChangeKind::from_notify(&EventKind::Modify(ModifyKind::Data(DataChange::Size)));
        assert!(kinds.contains(ChangeKind::WRITE | ChangeKind::SIZE_INCREASE));
    }

    #[test]
    fn test_removal_does_not_intersect_write_mask() {
        let kinds = ChangeKind::from_notify(&EventKind::Remove(notify::event::RemoveKind::File));
        assert!(!kinds.intersects(ChangeKind::WRITE));
        assert!(kinds.intersects(ChangeKind::DEFAULT));
    }

    #[test]
    fn test_default_mask_intersects_everything() {
        assert!(ChangeKind::DEFAULT.intersects(ChangeKind::RENAME));
        assert!(ChangeKind::DEFAULT.intersects(ChangeKind::UNLOCK));
    }
}
