//! Geometry helpers: bounding boxes, coordinate mapping, board bounds and hit testing.

use crate::handles::{ResizeHandle, rotate_point};
use crate::item::{Item, ItemId};
use kurbo::{Point, Rect, Size, Vec2};
use std::sync::Arc;

/// Union of the bounds of `items`, or `None` when there are none.
pub fn compute_bounding_box<'a>(items: impl IntoIterator<Item = &'a Item>) -> Option<Rect> {
    items
        .into_iter()
        .map(Item::bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

/// Convert a point from screen space to canvas space.
///
/// `zoom` is the effective zoom (user zoom times render scale).
pub fn screen_to_canvas(screen: Point, pan: Vec2, zoom: f64) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Convert a point from canvas space to screen space.
pub fn canvas_to_screen(canvas: Point, pan: Vec2, zoom: f64) -> Point {
    Point::new(canvas.x * zoom + pan.x, canvas.y * zoom + pan.y)
}

fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo { lo } else { value.clamp(lo, hi) }
}

/// Clamp the top-left corner of a `size`-sized rectangle so it stays within
/// the board expanded by `margin` on every side.
///
/// Items larger than the board are pinned to the left/top bound.
pub fn constrain_to_bounds(origin: Point, size: Size, board: Size, margin: f64) -> Point {
    Point::new(
        clamp_axis(origin.x, -margin, board.width + margin - size.width),
        clamp_axis(origin.y, -margin, board.height + margin - size.height),
    )
}

/// Keep a rectangle being resized by `handle` inside the board.
///
/// Only the edges the handle moves are pulled back; the opposite edges never
/// move. `min_size` wins over the board bounds.
pub fn constrain_resize(
    rect: Rect,
    handle: ResizeHandle,
    board: Size,
    margin: f64,
    min_size: f64,
) -> Rect {
    let (lo_x, hi_x) = (-margin, board.width + margin);
    let (lo_y, hi_y) = (-margin, board.height + margin);
    let mut r = rect;

    if handle.moves_left() {
        r.x0 = r.x0.max(lo_x);
        if r.width() < min_size {
            r.x0 = r.x1 - min_size;
        }
    }
    if handle.moves_right() {
        r.x1 = r.x1.min(hi_x);
        if r.width() < min_size {
            r.x1 = r.x0 + min_size;
        }
    }
    if handle.moves_top() {
        r.y0 = r.y0.max(lo_y);
        if r.height() < min_size {
            r.y0 = r.y1 - min_size;
        }
    }
    if handle.moves_bottom() {
        r.y1 = r.y1.min(hi_y);
        if r.height() < min_size {
            r.y1 = r.y0 + min_size;
        }
    }
    r
}

/// Strict overlap test: rectangles that only touch do not intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Whether `point` (canvas space) lies inside the item, honouring rotation.
pub fn item_contains_point(item: &Item, point: Point) -> bool {
    let local = rotate_point(point, item.center(), -item.rotation);
    let b = item.bounds();
    local.x >= b.x0 && local.x <= b.x1 && local.y >= b.y0 && local.y <= b.y1
}

/// The topmost visible item under `point`.
///
/// Higher z wins; equal z goes to the item later in the list.
pub fn hit_test(items: &[Arc<Item>], point: Point) -> Option<ItemId> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_visible() && item_contains_point(item, point))
        .max_by_key(|(index, item)| (item.position.z, *index))
        .map(|(_, item)| item.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    const EPS: f64 = 1e-9;

    fn item_at(x: f64, y: f64, w: f64, h: f64) -> Item {
        Item::new(ItemKind::Shape, "", Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_bounding_box_empty() {
        assert_eq!(compute_bounding_box(std::iter::empty::<&Item>()), None);
    }

    #[test]
    fn test_bounding_box_union() {
        let a = item_at(10.0, 10.0, 20.0, 20.0);
        let b = item_at(50.0, -5.0, 10.0, 10.0);
        assert_eq!(
            compute_bounding_box([&a, &b]),
            Some(Rect::new(10.0, -5.0, 60.0, 30.0))
        );
    }

    #[test]
    fn test_screen_canvas_mapping() {
        let pan = Vec2::new(100.0, 50.0);
        let canvas = screen_to_canvas(Point::new(300.0, 250.0), pan, 2.0);
        assert_eq!(canvas, Point::new(100.0, 100.0));
        let screen = canvas_to_screen(canvas, pan, 2.0);
        assert!((screen.x - 300.0).abs() < EPS);
        assert!((screen.y - 250.0).abs() < EPS);
    }

    #[test]
    fn test_constrain_to_bounds() {
        let board = Size::new(1600.0, 1200.0);
        let size = Size::new(100.0, 100.0);
        assert_eq!(
            constrain_to_bounds(Point::new(-30.0, 1150.0), size, board, 0.0),
            Point::new(0.0, 1100.0)
        );
        assert_eq!(
            constrain_to_bounds(Point::new(-30.0, 20.0), size, board, 10.0),
            Point::new(-10.0, 20.0)
        );
    }

    #[test]
    fn test_constrain_oversized_item_pins_to_origin() {
        let origin = constrain_to_bounds(
            Point::new(300.0, 300.0),
            Size::new(500.0, 500.0),
            Size::new(200.0, 200.0),
            0.0,
        );
        assert_eq!(origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_constrain_resize_shrinks_moving_edge() {
        let board = Size::new(200.0, 200.0);
        let rect = constrain_resize(
            Rect::new(100.0, 100.0, 260.0, 230.0),
            ResizeHandle::SE,
            board,
            0.0,
            40.0,
        );
        assert_eq!(rect, Rect::new(100.0, 100.0, 200.0, 200.0));
    }

    #[test]
    fn test_constrain_resize_min_size_wins() {
        let board = Size::new(200.0, 200.0);
        let rect = constrain_resize(
            Rect::new(190.0, 0.0, 260.0, 50.0),
            ResizeHandle::E,
            board,
            0.0,
            40.0,
        );
        assert!((rect.x0 - 190.0).abs() < EPS);
        assert!((rect.width() - 40.0).abs() < EPS);
    }

    #[test]
    fn test_rects_intersect_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_intersect(a, Rect::new(5.0, 5.0, 20.0, 20.0)));
        assert!(!rects_intersect(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_contains_point_rotated() {
        let mut item = item_at(0.0, 40.0, 100.0, 20.0);
        assert!(item_contains_point(&item, Point::new(5.0, 50.0)));
        item.rotation = 90.0;
        // Now a vertical bar centered at (50,50).
        assert!(!item_contains_point(&item, Point::new(5.0, 50.0)));
        assert!(item_contains_point(&item, Point::new(50.0, 5.0)));
    }

    #[test]
    fn test_hit_test_topmost() {
        let low = item_at(0.0, 0.0, 100.0, 100.0).with_z(1);
        let high = item_at(50.0, 50.0, 100.0, 100.0).with_z(5);
        let high_id = high.id();
        let items = vec![Arc::new(high), Arc::new(low)];
        assert_eq!(hit_test(&items, Point::new(60.0, 60.0)), Some(high_id));
        assert_eq!(hit_test(&items, Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_hit_test_skips_hidden() {
        let mut hidden = item_at(0.0, 0.0, 100.0, 100.0).with_z(9);
        hidden.hidden = true;
        let below = item_at(0.0, 0.0, 100.0, 100.0);
        let below_id = below.id();
        let items = vec![Arc::new(below), Arc::new(hidden)];
        assert_eq!(hit_test(&items, Point::new(10.0, 10.0)), Some(below_id));
    }
}
