//! Canvas items and partial updates.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a canvas item.
pub type ItemId = Uuid;

/// Identifier shared by the members of a group.
pub type GroupId = Uuid;

/// The canonical item list. Unchanged items are shared between
/// successive lists (and history entries) by reference.
pub type ItemList = Vec<Arc<Item>>;

/// Smallest width/height an item may be resized to (canvas units).
pub const MIN_ITEM_SIZE: f64 = 40.0;

/// What an item displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Content is an image URL.
    Image,
    /// Content is free text.
    Text,
    /// Content is sticky-note text.
    Note,
    /// Content is a hex color swatch.
    Color,
    /// Content is empty; the shape kind lives in `metadata`.
    Shape,
}

impl ItemKind {
    /// Whether double-clicking the item opens the inline text editor.
    pub fn supports_inline_edit(self) -> bool {
        matches!(self, ItemKind::Text | ItemKind::Note)
    }
}

/// Position of an item: top-left corner plus paint order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Paint/selection order, higher is on top.
    #[serde(default)]
    pub z: i64,
}

/// A placed object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    #[serde(rename = "type")]
    kind: ItemKind,
    /// Type-dependent payload (URL, text, hex color, or empty).
    #[serde(default)]
    pub content: String,
    pub position: Position,
    pub size: Size,
    /// Rotation in degrees around the item center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub style: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Item {
    /// Create a new item with a fresh id at `origin`.
    pub fn new(kind: ItemKind, content: impl Into<String>, origin: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            position: Position {
                x: origin.x,
                y: origin.y,
                z: 0,
            },
            size,
            rotation: 0.0,
            locked: false,
            hidden: false,
            group_id: None,
            style: Map::new(),
            metadata: Map::new(),
        }
    }

    /// Set the paint order.
    pub fn with_z(mut self, z: i64) -> Self {
        self.position.z = z;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Replace the id with a fresh one (used when cloning items).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.position.x, self.position.y)
    }

    /// Unrotated bounding box in canvas units.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Whether the item can be hit, selected, or rendered.
    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Whether drag/resize/rotate may act on the item.
    pub fn is_movable(&self) -> bool {
        !self.locked && !self.hidden
    }
}

/// Find an item by id.
pub fn find_item(items: &[Arc<Item>], id: ItemId) -> Option<&Arc<Item>> {
    items.iter().find(|item| item.id() == id)
}

/// A shallow set of changes merged into an item.
///
/// `None` leaves the field untouched. `group_id: Some(None)` clears the group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<i64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
    pub group_id: Option<Option<GroupId>>,
    pub style: Option<Map<String, Value>>,
    pub metadata: Option<Map<String, Value>>,
}

impl ItemPatch {
    /// Move the top-left corner.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Set position and size from a rectangle.
    pub fn frame(rect: Rect) -> Self {
        Self {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn z(z: i64) -> Self {
        Self {
            z: Some(z),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn group(group_id: Option<GroupId>) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop non-finite numbers and raise sizes to `min_size`.
    pub fn sanitized(mut self, min_size: f64) -> Self {
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        self.x = finite(self.x);
        self.y = finite(self.y);
        self.rotation = finite(self.rotation);
        self.width = finite(self.width).map(|w| w.max(min_size));
        self.height = finite(self.height).map(|h| h.max(min_size));
        self
    }

    /// Return a copy of `item` with this patch merged in.
    pub fn apply(&self, item: &Item) -> Item {
        let mut item = item.clone();
        if let Some(content) = &self.content {
            item.content = content.clone();
        }
        if let Some(x) = self.x {
            item.position.x = x;
        }
        if let Some(y) = self.y {
            item.position.y = y;
        }
        if let Some(z) = self.z {
            item.position.z = z;
        }
        if let Some(width) = self.width {
            item.size.width = width;
        }
        if let Some(height) = self.height {
            item.size.height = height;
        }
        if let Some(rotation) = self.rotation {
            item.rotation = rotation;
        }
        if let Some(locked) = self.locked {
            item.locked = locked;
        }
        if let Some(hidden) = self.hidden {
            item.hidden = hidden;
        }
        if let Some(group_id) = self.group_id {
            item.group_id = group_id;
        }
        if let Some(style) = &self.style {
            item.style = style.clone();
        }
        if let Some(metadata) = &self.metadata {
            item.metadata = metadata.clone();
        }
        item
    }
}

/// Numeric fields exposed by the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    X,
    Y,
    Width,
    Height,
    Rotation,
}

impl NumericField {
    /// Current value of the field on `item`.
    pub fn current(self, item: &Item) -> f64 {
        match self {
            NumericField::X => item.position.x,
            NumericField::Y => item.position.y,
            NumericField::Width => item.size.width,
            NumericField::Height => item.size.height,
            NumericField::Rotation => item.rotation,
        }
    }

    /// A patch setting this field to `value`.
    pub fn patch(self, value: f64) -> ItemPatch {
        let mut patch = ItemPatch::default();
        match self {
            NumericField::X => patch.x = Some(value),
            NumericField::Y => patch.y = Some(value),
            NumericField::Width => patch.width = Some(value),
            NumericField::Height => patch.height = Some(value),
            NumericField::Rotation => patch.rotation = Some(value),
        }
        patch
    }
}

/// Parse a manually typed number, falling back when it is not a finite value.
pub fn parse_numeric(raw: &str, fallback: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            log::warn!("Ignoring non-numeric input {:?}, keeping {}", raw, fallback);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Item {
        Item::new(
            ItemKind::Note,
            "hello",
            Point::new(10.0, 20.0),
            Size::new(100.0, 80.0),
        )
    }

    #[test]
    fn test_new_item_has_unique_id() {
        let a = note();
        let b = note();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.bounds(), Rect::new(10.0, 20.0, 110.0, 100.0));
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let item = note();
        let patched = ItemPatch::position(5.0, 6.0).apply(&item);
        assert_eq!(patched.origin(), Point::new(5.0, 6.0));
        assert_eq!(patched.size, item.size);
        assert_eq!(patched.content, "hello");
        assert_eq!(patched.id(), item.id());
    }

    #[test]
    fn test_patch_clears_group() {
        let mut item = note();
        item.group_id = Some(Uuid::new_v4());
        let patched = ItemPatch::group(None).apply(&item);
        assert!(patched.group_id.is_none());
    }

    #[test]
    fn test_sanitized_patch_drops_nan_and_floors_size() {
        let patch = ItemPatch {
            x: Some(f64::NAN),
            width: Some(3.0),
            height: Some(f64::INFINITY),
            ..ItemPatch::default()
        }
        .sanitized(MIN_ITEM_SIZE);
        assert_eq!(patch.x, None);
        assert_eq!(patch.width, Some(MIN_ITEM_SIZE));
        assert_eq!(patch.height, None);
    }

    #[test]
    fn test_parse_numeric_fallback() {
        assert!((parse_numeric(" 42.5 ", 0.0) - 42.5).abs() < f64::EPSILON);
        assert!((parse_numeric("abc", 7.0) - 7.0).abs() < f64::EPSILON);
        assert!((parse_numeric("NaN", 3.0) - 3.0).abs() < f64::EPSILON);
        assert!((parse_numeric("", 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_numeric_field_roundtrip() {
        let item = note();
        let patched = NumericField::Width.patch(250.0).apply(&item);
        assert!((NumericField::Width.current(&patched) - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_uses_type_key() {
        let item = note();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "note");
        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_inline_edit_kinds() {
        assert!(ItemKind::Text.supports_inline_edit());
        assert!(ItemKind::Note.supports_inline_edit());
        assert!(!ItemKind::Image.supports_inline_edit());
    }
}
