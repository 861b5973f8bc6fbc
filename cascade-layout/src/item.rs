//! Identity-keyed placement side table.
//!
//! Items are caller-owned and opaque; the engine associates layout results
//! with them by allocation identity rather than by value, so two equal
//! records in different allocations stay two different items.

use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;

use crate::placement::Placement;

/// Identity of a caller-owned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ItemKey(usize);

impl ItemKey {
    /// Keys the allocation behind `item`. Clones of the same `Arc` share a
    /// key; distinct allocations never do.
    pub(crate) fn of<T>(item: &Arc<T>) -> Self {
        Self(Arc::as_ptr(item) as usize)
    }
}

struct Entry<T> {
    item: Weak<T>,
    placement: Placement,
}

/// Side table mapping item identity to its current [`Placement`].
///
/// Holds only weak item references so the table never keeps dropped items
/// alive. Dead entries are swept once per pass, which also prevents a
/// recycled allocation address from resurrecting a stale placement.
pub(crate) struct PlacementTable<T> {
    entries: FxHashMap<ItemKey, Entry<T>>,
}

impl<T> Default for PlacementTable<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<T> PlacementTable<T> {
    pub(crate) fn get(&self, key: ItemKey) -> Option<&Placement> {
        self.entries.get(&key).map(|entry| &entry.placement)
    }

    /// Stores `placement` for `item`, replacing (never merging) any previous
    /// record.
    pub(crate) fn insert(&mut self, item: &Arc<T>, placement: Placement) {
        self.entries.insert(
            ItemKey::of(item),
            Entry {
                item: Arc::downgrade(item),
                placement,
            },
        );
    }

    /// Drops entries whose items no longer exist.
    pub(crate) fn sweep(&mut self) {
        self.entries
            .retain(|_, entry| entry.item.strong_count() > 0);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash::RenderHash, placement::CellPosition, px::Px};

    fn placement(hash: u64) -> Placement {
        Placement {
            hash: RenderHash(hash),
            width: Px(100),
            left: Px::ZERO,
            top: Px::ZERO,
            height: Px(50),
            position: CellPosition::default(),
        }
    }

    #[test]
    fn keyed_by_identity_not_value() {
        let a = Arc::new(7_u32);
        let b = Arc::new(7_u32);
        assert_ne!(ItemKey::of(&a), ItemKey::of(&b));
        assert_eq!(ItemKey::of(&a), ItemKey::of(&a.clone()));
    }

    #[test]
    fn insert_replaces_previous_record() {
        let item = Arc::new(1_u32);
        let mut table = PlacementTable::default();
        table.insert(&item, placement(1));
        table.insert(&item, placement(2));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(ItemKey::of(&item)).map(|p| p.hash),
            Some(RenderHash(2))
        );
    }

    #[test]
    fn sweep_drops_dead_items() {
        let kept = Arc::new(1_u32);
        let dropped = Arc::new(2_u32);
        let mut table = PlacementTable::default();
        table.insert(&kept, placement(1));
        table.insert(&dropped, placement(2));
        drop(dropped);
        table.sweep();
        assert_eq!(table.len(), 1);
        assert!(table.get(ItemKey::of(&kept)).is_some());
    }
}
