//! Resize and rotate handles for selected items.

use crate::item::Item;
use crate::snap::{ANGLE_SNAP_INCREMENT, snap_angle};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;
/// Distance from the top edge to the rotation handle (in canvas units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// One of the eight resize handles around an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    /// Whether dragging this handle moves the left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::NE | ResizeHandle::NW | ResizeHandle::SE | ResizeHandle::SW
        )
    }

    /// Offset of the handle from the rectangle center, before rotation.
    fn offset_from_center(self, size: kurbo::Size) -> Vec2 {
        let hx = size.width / 2.0;
        let hy = size.height / 2.0;
        let x = if self.moves_left() {
            -hx
        } else if self.moves_right() {
            hx
        } else {
            0.0
        };
        let y = if self.moves_top() {
            -hy
        } else if self.moves_bottom() {
            hy
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Resize(ResizeHandle),
    /// Rotation handle (positioned above the item).
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in canvas coordinates) hits this handle.
    /// `tolerance` should be adjusted for zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Rotate `point` around `center` by `degrees` (clockwise on screen).
pub fn rotate_point(point: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin_r, cos_r) = degrees.to_radians().sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos_r - d.y * sin_r,
        center.y + d.x * sin_r + d.y * cos_r,
    )
}

/// All handles of an item, rotated with the item around its center.
pub fn get_handles(item: &Item) -> Vec<Handle> {
    let center = item.center();
    let place = |offset: Vec2| rotate_point(center + offset, center, item.rotation);

    let mut handles: Vec<Handle> = ResizeHandle::ALL
        .iter()
        .map(|&h| Handle::new(place(h.offset_from_center(item.size)), HandleKind::Resize(h)))
        .collect();
    handles.push(Handle::new(
        place(Vec2::new(
            0.0,
            -item.size.height / 2.0 - ROTATE_HANDLE_OFFSET,
        )),
        HandleKind::Rotate,
    ));
    handles
}

/// Find the handle closest to `point` within `tolerance`.
pub fn hit_test_handles(item: &Item, point: Point, tolerance: f64) -> Option<HandleKind> {
    get_handles(item)
        .into_iter()
        .filter(|handle| handle.hit_test(point, tolerance))
        .min_by(|a, b| {
            let da = (point - a.position).hypot2();
            let db = (point - b.position).hypot2();
            da.total_cmp(&db)
        })
        .map(|handle| handle.kind)
}

/// Resize `original` by dragging `handle` by `delta` (canvas units).
///
/// The edge opposite the handle stays fixed. With `keep_aspect_ratio` on a
/// corner handle the dominant relative change drives both dimensions; edge
/// handles always change a single dimension. Neither dimension drops
/// below `min_size`.
pub fn apply_resize(
    original: Rect,
    handle: ResizeHandle,
    delta: Vec2,
    keep_aspect_ratio: bool,
    min_size: f64,
) -> Rect {
    let w0 = original.width();
    let h0 = original.height();

    let mut width = w0;
    let mut height = h0;
    if handle.moves_right() {
        width += delta.x;
    } else if handle.moves_left() {
        width -= delta.x;
    }
    if handle.moves_bottom() {
        height += delta.y;
    } else if handle.moves_top() {
        height -= delta.y;
    }

    if keep_aspect_ratio && handle.is_corner() && w0 > 0.0 && h0 > 0.0 {
        let sx = width / w0;
        let sy = height / h0;
        let scale = if (sx - 1.0).abs() >= (sy - 1.0).abs() { sx } else { sy };
        let floor = (min_size / w0).max(min_size / h0);
        let scale = scale.max(floor);
        width = w0 * scale;
        height = h0 * scale;
    } else {
        width = width.max(min_size);
        height = height.max(min_size);
    }

    let x0 = if handle.moves_left() {
        original.x1 - width
    } else {
        original.x0
    };
    let y0 = if handle.moves_top() {
        original.y1 - height
    } else {
        original.y0
    };
    Rect::new(x0, y0, x0 + width, y0 + height)
}

/// Rotation (degrees) after dragging the rotation handle from `start` to
/// `current` around `center`.
///
/// The angular delta is taken in (-180, 180]. With `snap` the result is
/// rounded to 15° steps.
pub fn rotation_from_drag(
    center: Point,
    start: Point,
    current: Point,
    start_rotation: f64,
    snap: bool,
) -> f64 {
    let a = start - center;
    let b = current - center;
    if a.hypot2() == 0.0 || b.hypot2() == 0.0 {
        return start_rotation;
    }
    let start_angle = a.y.atan2(a.x);
    let current_angle = b.y.atan2(b.x);
    let mut delta = (current_angle - start_angle).to_degrees();
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    let rotation = start_rotation + delta;
    if snap {
        snap_angle(rotation, ANGLE_SNAP_INCREMENT)
    } else {
        rotation
    }
}
