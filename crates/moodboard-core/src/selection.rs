//! The set of selected items.

use crate::item::{Item, ItemId};
use std::sync::Arc;

/// Ordered set of selected item ids.
///
/// The first id is the primary selection. Mutators return whether the set
/// changed so callers can decide whether to notify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ItemId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// The first selected id.
    pub fn primary(&self) -> Option<ItemId> {
        self.ids.first().copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the selection with a single id.
    pub fn select(&mut self, id: ItemId) -> bool {
        if self.ids == [id] {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }

    /// Replace the selection with `ids`, dropping duplicates.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ItemId>) -> bool {
        let mut next = Vec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    pub fn add(&mut self, id: ItemId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&x| x != id);
        self.ids.len() != before
    }

    /// Add the id if absent, remove it otherwise.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if !self.remove(id) {
            self.ids.push(id);
        }
        true
    }

    /// Union with `ids`, keeping existing order.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = ItemId>) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.add(id);
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Pointer selection: toggle when additive, replace otherwise.
    pub fn click(&mut self, id: ItemId, additive: bool) -> bool {
        if additive {
            self.toggle(id)
        } else {
            self.select(id)
        }
    }

    /// Select every visible item.
    pub fn select_all(&mut self, items: &[Arc<Item>]) -> bool {
        self.set(
            items
                .iter()
                .filter(|item| item.is_visible())
                .map(|item| item.id()),
        )
    }

    /// Drop ids that no longer exist or are hidden.
    pub fn prune(&mut self, items: &[Arc<Item>]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| {
            items
                .iter()
                .any(|item| item.id() == *id && item.is_visible())
        });
        self.ids.len() != before
    }
}
