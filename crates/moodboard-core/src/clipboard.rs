//! In-process clipboard for copy, cut and paste.

use crate::item::{Item, ItemId};
use crate::ops::clone_items;
use kurbo::Vec2;
use std::sync::Arc;

/// Holds deep copies of items so later edits to the originals do not leak
/// into a paste.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<Item>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the items in `ids` (in list order). Returns how many were copied.
    ///
    /// Copying nothing leaves the previous contents in place.
    pub fn copy(&mut self, items: &[Arc<Item>], ids: &[ItemId]) -> usize {
        let copied: Vec<Item> = items
            .iter()
            .filter(|item| ids.contains(&item.id()))
            .map(|item| (**item).clone())
            .collect();
        if copied.is_empty() {
            return 0;
        }
        log::debug!("Copied {} items to clipboard", copied.len());
        self.items = copied;
        self.items.len()
    }

    /// Fresh copies of the clipboard contents, shifted by `offset` and
    /// stacked above `existing`.
    pub fn paste(&self, existing: &[Arc<Item>], offset: Vec2) -> Vec<Item> {
        clone_items(&self.items, existing, offset)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
