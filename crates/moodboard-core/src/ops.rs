//! Pure item-list mutators.
//!
//! Every function takes the current list and returns a new one. Items that
//! are not touched keep the same `Arc`, so callers can detect changes with
//! [`same_items`] without comparing field by field.

use crate::geometry::compute_bounding_box;
use crate::item::{GroupId, Item, ItemId, ItemList, ItemPatch};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Edge or center to line items up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

/// Direction for distributing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

fn patched(item: &Arc<Item>, patch: &ItemPatch) -> Arc<Item> {
    let next = patch.apply(item);
    if next == **item {
        Arc::clone(item)
    } else {
        Arc::new(next)
    }
}

/// Whether two lists hold the same items in the same order.
pub fn same_items(a: &[Arc<Item>], b: &[Arc<Item>]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| Arc::ptr_eq(x, y) || **x == **y)
}

/// Highest z in the list.
pub fn max_z(items: &[Arc<Item>]) -> Option<i64> {
    items.iter().map(|item| item.position.z).max()
}

/// Apply the same patch to every item in `ids`. Unknown ids are ignored.
pub fn update_items(items: &[Arc<Item>], ids: &[ItemId], patch: &ItemPatch) -> ItemList {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    items
        .iter()
        .map(|item| {
            if targets.contains(&item.id()) {
                patched(item, patch)
            } else {
                Arc::clone(item)
            }
        })
        .collect()
}

/// Apply a distinct patch per item. Later patches for the same id win.
pub fn update_each(items: &[Arc<Item>], updates: &[(ItemId, ItemPatch)]) -> ItemList {
    let by_id: HashMap<ItemId, &ItemPatch> = updates.iter().map(|(id, p)| (*id, p)).collect();
    items
        .iter()
        .map(|item| match by_id.get(&item.id()) {
            Some(patch) => patched(item, patch),
            None => Arc::clone(item),
        })
        .collect()
}

/// Remove the items in `ids`. The caller prunes the selection.
pub fn delete_items(items: &[Arc<Item>], ids: &[ItemId]) -> ItemList {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    items
        .iter()
        .filter(|item| !targets.contains(&item.id()))
        .cloned()
        .collect()
}

/// Deep-copy `sources` for insertion into `existing`.
///
/// Copies get fresh ids, are shifted by `offset` and stacked above every
/// existing item while keeping their relative order. Group ids are remapped
/// so copies form new groups instead of joining the originals.
pub fn clone_items(sources: &[Item], existing: &[Arc<Item>], offset: Vec2) -> Vec<Item> {
    let base = max_z(existing).map_or(0, |z| z + 1);
    let lowest = sources.iter().map(|s| s.position.z).min().unwrap_or(0);
    let mut groups: HashMap<GroupId, GroupId> = HashMap::new();

    sources
        .iter()
        .map(|source| {
            let mut copy = source.clone();
            copy.regenerate_id();
            copy.position.x += offset.x;
            copy.position.y += offset.y;
            copy.position.z = base + (source.position.z - lowest);
            copy.group_id = source
                .group_id
                .map(|g| *groups.entry(g).or_insert_with(Uuid::new_v4));
            copy
        })
        .collect()
}

/// Duplicate the items in `ids`, returning the new list and the new ids.
pub fn duplicate_items(
    items: &[Arc<Item>],
    ids: &[ItemId],
    offset: Vec2,
) -> (ItemList, Vec<ItemId>) {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    let sources: Vec<Item> = items
        .iter()
        .filter(|item| targets.contains(&item.id()))
        .map(|item| (**item).clone())
        .collect();
    let copies = clone_items(&sources, items, offset);
    let new_ids = copies.iter().map(Item::id).collect();

    let mut next: ItemList = items.to_vec();
    next.extend(copies.into_iter().map(Arc::new));
    (next, new_ids)
}

/// Set explicit z values.
pub fn reorder_z(items: &[Arc<Item>], updates: &[(ItemId, i64)]) -> ItemList {
    let patches: Vec<(ItemId, ItemPatch)> =
        updates.iter().map(|(id, z)| (*id, ItemPatch::z(*z))).collect();
    update_each(items, &patches)
}

/// Targets ordered by z (list order breaks ties).
fn targets_by_z<'a>(items: &'a [Arc<Item>], targets: &HashSet<ItemId>) -> Vec<&'a Arc<Item>> {
    let mut selected: Vec<&Arc<Item>> = items
        .iter()
        .filter(|item| targets.contains(&item.id()))
        .collect();
    selected.sort_by_key(|item| item.position.z);
    selected
}

/// Move the items above everything else, keeping their relative order.
pub fn bring_to_front(items: &[Arc<Item>], ids: &[ItemId]) -> ItemList {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    let others_max = items
        .iter()
        .filter(|item| !targets.contains(&item.id()))
        .map(|item| item.position.z)
        .max();
    let selected = targets_by_z(items, &targets);
    let Some(others_max) = others_max else {
        return items.to_vec();
    };
    if selected.iter().all(|item| item.position.z > others_max) {
        return items.to_vec();
    }
    let updates: Vec<(ItemId, i64)> = selected
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), others_max + 1 + i as i64))
        .collect();
    reorder_z(items, &updates)
}

/// Move the items below everything else, keeping their relative order.
pub fn send_to_back(items: &[Arc<Item>], ids: &[ItemId]) -> ItemList {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    let others_min = items
        .iter()
        .filter(|item| !targets.contains(&item.id()))
        .map(|item| item.position.z)
        .min();
    let selected = targets_by_z(items, &targets);
    let Some(others_min) = others_min else {
        return items.to_vec();
    };
    if selected.iter().all(|item| item.position.z < others_min) {
        return items.to_vec();
    }
    let count = selected.len() as i64;
    let updates: Vec<(ItemId, i64)> = selected
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), others_min - count + i as i64))
        .collect();
    reorder_z(items, &updates)
}

/// Raise each item by one step.
pub fn bring_forward(items: &[Arc<Item>], ids: &[ItemId]) -> ItemList {
    shift_z(items, ids, 1)
}

/// Lower each item by one step.
pub fn send_backward(items: &[Arc<Item>], ids: &[ItemId]) -> ItemList {
    shift_z(items, ids, -1)
}

fn shift_z(items: &[Arc<Item>], ids: &[ItemId], step: i64) -> ItemList {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    items
        .iter()
        .map(|item| {
            if targets.contains(&item.id()) {
                patched(item, &ItemPatch::z(item.position.z + step))
            } else {
                Arc::clone(item)
            }
        })
        .collect()
}

/// Add every member of any group touched by `ids`, in list order.
pub fn expand_groups(items: &[Arc<Item>], ids: &[ItemId]) -> Vec<ItemId> {
    let targets: HashSet<ItemId> = ids.iter().copied().collect();
    let groups: HashSet<GroupId> = items
        .iter()
        .filter(|item| targets.contains(&item.id()))
        .filter_map(|item| item.group_id)
        .collect();
    items
        .iter()
        .filter(|item| {
            targets.contains(&item.id()) || item.group_id.is_some_and(|g| groups.contains(&g))
        })
        .map(|item| item.id())
        .collect()
}

/// Put the items in a new group. Needs at least two existing items.
pub fn group_items(items: &[Arc<Item>], ids: &[ItemId]) -> Option<(ItemList, GroupId)> {
    let present = items.iter().filter(|item| ids.contains(&item.id())).count();
    if present < 2 {
        return None;
    }
    let group_id = Uuid::new_v4();
    log::debug!("Grouping {} items into {}", present, group_id);
    Some((update_items(items, ids, &ItemPatch::group(Some(group_id))), group_id))
}

/// Dissolve every group any of `ids` belongs to.
pub fn ungroup_items(items: &[Arc<Item>], ids: &[ItemId]) -> ItemList {
    let members = expand_groups(items, ids);
    update_items(items, &members, &ItemPatch::group(None))
}

/// Line items up against the bounding box of the set.
///
/// Locked items are left in place. Fewer than two movable items is a no-op.
pub fn align_items(items: &[Arc<Item>], ids: &[ItemId], alignment: Alignment) -> ItemList {
    let targets: Vec<&Item> = items
        .iter()
        .map(|item| &**item)
        .filter(|item| ids.contains(&item.id()) && !item.locked)
        .collect();
    if targets.len() < 2 {
        return items.to_vec();
    }
    let Some(bbox) = compute_bounding_box(targets.iter().copied()) else {
        return items.to_vec();
    };

    let updates: Vec<(ItemId, ItemPatch)> = targets
        .iter()
        .map(|item| {
            let b = item.bounds();
            let mut patch = ItemPatch::default();
            match alignment {
                Alignment::Left => patch.x = Some(bbox.x0),
                Alignment::Center => patch.x = Some(bbox.center().x - b.width() / 2.0),
                Alignment::Right => patch.x = Some(bbox.x1 - b.width()),
                Alignment::Top => patch.y = Some(bbox.y0),
                Alignment::Middle => patch.y = Some(bbox.center().y - b.height() / 2.0),
                Alignment::Bottom => patch.y = Some(bbox.y1 - b.height()),
            }
            (item.id(), patch)
        })
        .collect();
    update_each(items, &updates)
}

/// Space items so the gaps between neighbouring edges are equal.
///
/// Items are ordered by their leading edge. The first and last keep their
/// place and the rest are laid out between them. Needs at least three
/// movable items.
pub fn distribute_items(items: &[Arc<Item>], ids: &[ItemId], axis: Axis) -> ItemList {
    let mut targets: Vec<(ItemId, Rect)> = items
        .iter()
        .filter(|item| ids.contains(&item.id()) && !item.locked)
        .map(|item| (item.id(), item.bounds()))
        .collect();
    if targets.len() < 3 {
        return items.to_vec();
    }

    let (lead, trail): (fn(&Rect) -> f64, fn(&Rect) -> f64) = match axis {
        Axis::Horizontal => (|r: &Rect| r.x0, |r: &Rect| r.x1),
        Axis::Vertical => (|r: &Rect| r.y0, |r: &Rect| r.y1),
    };
    targets.sort_by(|a, b| lead(&a.1).total_cmp(&lead(&b.1)));
    let n = targets.len();
    let start = lead(&targets[0].1);
    let end = trail(&targets[n - 1].1);
    let occupied: f64 = targets.iter().map(|(_, r)| trail(r) - lead(r)).sum();
    let gap = (end - start - occupied) / (n - 1) as f64;

    let mut cursor = trail(&targets[0].1) + gap;
    let mut updates: Vec<(ItemId, ItemPatch)> = Vec::with_capacity(n - 2);
    for (id, rect) in &targets[1..n - 1] {
        let patch = match axis {
            Axis::Horizontal => ItemPatch {
                x: Some(cursor),
                ..ItemPatch::default()
            },
            Axis::Vertical => ItemPatch {
                y: Some(cursor),
                ..ItemPatch::default()
            },
        };
        updates.push((*id, patch));
        cursor += trail(rect) - lead(rect) + gap;
    }
    update_each(items, &updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use kurbo::{Point, Size};

    const EPS: f64 = 1e-9;

    fn item(x: f64, y: f64, z: i64) -> Arc<Item> {
        Arc::new(
            Item::new(ItemKind::Note, "n", Point::new(x, y), Size::new(50.0, 50.0)).with_z(z),
        )
    }

    fn z_of(items: &[Arc<Item>], id: ItemId) -> i64 {
        items.iter().find(|i| i.id() == id).unwrap().position.z
    }

    #[test]
    fn test_update_keeps_untouched_references() {
        let items = vec![item(0.0, 0.0, 0), item(100.0, 0.0, 1)];
        let target = items[0].id();
        let next = update_items(&items, &[target], &ItemPatch::position(10.0, 10.0));
        assert!(!Arc::ptr_eq(&items[0], &next[0]));
        assert!(Arc::ptr_eq(&items[1], &next[1]));
        assert_eq!(next[0].origin(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_update_with_same_values_reuses_reference() {
        let items = vec![item(0.0, 0.0, 0)];
        let next = update_items(&items, &[items[0].id()], &ItemPatch::position(0.0, 0.0));
        assert!(Arc::ptr_eq(&items[0], &next[0]));
        assert!(same_items(&items, &next));
    }

    #[test]
    fn test_delete_items() {
        let items = vec![item(0.0, 0.0, 0), item(100.0, 0.0, 1)];
        let next = delete_items(&items, &[items[0].id(), Uuid::new_v4()]);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id(), items[1].id());
    }

    #[test]
    fn test_duplicate_offsets_and_stacks() {
        let items = vec![item(0.0, 0.0, 0), item(100.0, 0.0, 7)];
        let (next, new_ids) = duplicate_items(&items, &[items[0].id()], Vec2::new(20.0, 20.0));
        assert_eq!(next.len(), 3);
        assert_eq!(new_ids.len(), 1);
        assert_ne!(new_ids[0], items[0].id());
        let copy = next.iter().find(|i| i.id() == new_ids[0]).unwrap();
        assert_eq!(copy.origin(), Point::new(20.0, 20.0));
        assert_eq!(copy.position.z, 8);
    }

    #[test]
    fn test_clone_items_remaps_groups() {
        let g = Uuid::new_v4();
        let mut a = Item::new(ItemKind::Text, "a", Point::ZERO, Size::new(50.0, 50.0));
        let mut b = a.clone();
        b.regenerate_id();
        a.group_id = Some(g);
        b.group_id = Some(g);
        let copies = clone_items(&[a, b], &[], Vec2::ZERO);
        let new_group = copies[0].group_id.unwrap();
        assert_ne!(new_group, g);
        assert_eq!(copies[1].group_id, Some(new_group));
    }

    #[test]
    fn test_bring_to_front_preserves_relative_order() {
        let items = vec![item(0.0, 0.0, 1), item(0.0, 0.0, 2), item(0.0, 0.0, 5)];
        let (a, b) = (items[0].id(), items[1].id());
        let next = bring_to_front(&items, &[b, a]);
        assert_eq!(z_of(&next, a), 6);
        assert_eq!(z_of(&next, b), 7);
    }

    #[test]
    fn test_bring_to_front_noop_when_on_top() {
        let items = vec![item(0.0, 0.0, 1), item(0.0, 0.0, 5)];
        let next = bring_to_front(&items, &[items[1].id()]);
        assert!(same_items(&items, &next));
    }

    #[test]
    fn test_send_to_back() {
        let items = vec![item(0.0, 0.0, 1), item(0.0, 0.0, 2), item(0.0, 0.0, 5)];
        let c = items[2].id();
        let next = send_to_back(&items, &[c]);
        assert_eq!(z_of(&next, c), 0);
    }

    #[test]
    fn test_forward_and_backward() {
        let items = vec![item(0.0, 0.0, 3)];
        let id = items[0].id();
        assert_eq!(z_of(&bring_forward(&items, &[id]), id), 4);
        assert_eq!(z_of(&send_backward(&items, &[id]), id), 2);
    }

    #[test]
    fn test_group_requires_two() {
        let items = vec![item(0.0, 0.0, 0), item(0.0, 0.0, 1)];
        assert!(group_items(&items, &[items[0].id()]).is_none());
        let (next, group) = group_items(&items, &[items[0].id(), items[1].id()]).unwrap();
        assert!(next.iter().all(|i| i.group_id == Some(group)));
    }

    #[test]
    fn test_ungroup_clears_all_members() {
        let items = vec![item(0.0, 0.0, 0), item(0.0, 0.0, 1), item(0.0, 0.0, 2)];
        let (grouped, _) = group_items(&items, &[items[0].id(), items[1].id()]).unwrap();
        let next = ungroup_items(&grouped, &[items[0].id()]);
        assert!(next.iter().all(|i| i.group_id.is_none()));
    }

    #[test]
    fn test_expand_groups() {
        let items = vec![item(0.0, 0.0, 0), item(0.0, 0.0, 1), item(0.0, 0.0, 2)];
        let (grouped, _) = group_items(&items, &[items[0].id(), items[2].id()]).unwrap();
        let expanded = expand_groups(&grouped, &[items[2].id()]);
        assert_eq!(expanded, vec![items[0].id(), items[2].id()]);
    }

    #[test]
    fn test_align_left_and_bottom() {
        let items = vec![item(10.0, 0.0, 0), item(40.0, 30.0, 1)];
        let ids = [items[0].id(), items[1].id()];
        let left = align_items(&items, &ids, Alignment::Left);
        assert!(left.iter().all(|i| (i.position.x - 10.0).abs() < EPS));
        let bottom = align_items(&items, &ids, Alignment::Bottom);
        assert!(bottom.iter().all(|i| (i.bounds().y1 - 80.0).abs() < EPS));
    }

    #[test]
    fn test_align_skips_locked() {
        let mut locked = Item::new(ItemKind::Note, "", Point::new(0.0, 0.0), Size::new(50.0, 50.0));
        locked.locked = true;
        let items = vec![Arc::new(locked), item(40.0, 0.0, 1), item(90.0, 0.0, 2)];
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        let next = align_items(&items, &ids, Alignment::Left);
        assert!(Arc::ptr_eq(&items[0], &next[0]));
        assert!((next[2].position.x - 40.0).abs() < EPS);
    }

    #[test]
    fn test_distribute_horizontal() {
        let items = vec![item(0.0, 0.0, 0), item(30.0, 0.0, 1), item(200.0, 0.0, 2)];
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        let next = distribute_items(&items, &ids, Axis::Horizontal);
        assert!((next[0].position.x - 0.0).abs() < EPS);
        assert!((next[1].position.x - 100.0).abs() < EPS);
        assert!((next[2].position.x - 200.0).abs() < EPS);
    }

    fn sized(x: f64, y: f64, width: f64, height: f64) -> Arc<Item> {
        Arc::new(Item::new(ItemKind::Image, "i", Point::new(x, y), Size::new(width, height)))
    }

    #[test]
    fn test_distribute_mixed_sizes_equal_gaps() {
        let items = vec![
            sized(500.0, 0.0, 100.0, 50.0),
            sized(0.0, 0.0, 50.0, 50.0),
            sized(300.0, 0.0, 50.0, 50.0),
            sized(60.0, 0.0, 200.0, 50.0),
        ];
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        let next = distribute_items(&items, &ids, Axis::Horizontal);

        let mut bounds: Vec<Rect> = next.iter().map(|i| i.bounds()).collect();
        bounds.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let gaps: Vec<f64> = bounds.windows(2).map(|w| w[1].x0 - w[0].x1).collect();
        assert_eq!(gaps.len(), 3);
        for gap in &gaps {
            assert!((gap - 200.0 / 3.0).abs() < 1e-6, "gaps {gaps:?}");
        }
        assert!((bounds[0].x0 - 0.0).abs() < EPS);
        assert!((bounds[3].x1 - 600.0).abs() < EPS);
        assert!(Arc::ptr_eq(&items[0], &next[0]));
        assert!(Arc::ptr_eq(&items[1], &next[1]));
    }

    #[test]
    fn test_distribute_vertical_keeps_widths() {
        let items = vec![
            sized(0.0, 0.0, 40.0, 40.0),
            sized(10.0, 45.0, 40.0, 100.0),
            sized(20.0, 300.0, 40.0, 60.0),
        ];
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        let next = distribute_items(&items, &ids, Axis::Vertical);
        assert!((next[1].position.y - 120.0).abs() < EPS);
        assert!((next[1].position.x - 10.0).abs() < EPS);
        assert!((next[1].size.height - 100.0).abs() < EPS);
    }

    #[test]
    fn test_align_three_left_matches_min_x() {
        let items = vec![item(70.0, 0.0, 0), item(15.0, 80.0, 1), item(120.0, 160.0, 2)];
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        let min_x = items.iter().map(|i| i.position.x).fold(f64::INFINITY, f64::min);
        let next = align_items(&items, &ids, Alignment::Left);
        for aligned in &next {
            assert!((aligned.position.x - min_x).abs() < EPS);
        }
        let ys: Vec<f64> = next.iter().map(|i| i.position.y).collect();
        assert_eq!(ys, vec![0.0, 80.0, 160.0]);
    }

    #[test]
    fn test_distribute_needs_three() {
        let items = vec![item(0.0, 0.0, 0), item(30.0, 0.0, 1)];
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        assert!(same_items(&items, &distribute_items(&items, &ids, Axis::Vertical)));
    }
}
