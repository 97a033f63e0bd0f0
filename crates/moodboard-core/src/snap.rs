//! Snap functionality for aligning items to the grid and to each other.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Distance within which edges/centers count as aligned (canvas units).
pub const GUIDE_THRESHOLD: f64 = 5.0;

/// Snap mode for aligning items to the grid or other items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// No snapping, no guides.
    #[default]
    None,
    /// Snap positions to the grid on release.
    Grid,
    /// Show alignment guides while dragging.
    Guides,
    /// Grid snapping and guides.
    All,
}

impl SnapMode {
    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::All)
    }

    /// Check if alignment guides are shown.
    pub fn shows_guides(self) -> bool {
        matches!(self, SnapMode::Guides | SnapMode::All)
    }
}

/// Round `value` to the nearest multiple of `grid_size`.
///
/// Identity when the grid size is not a positive finite number.
pub fn snap(value: f64, grid_size: f64) -> f64 {
    if grid_size > 0.0 && grid_size.is_finite() {
        (value / grid_size).round() * grid_size
    } else {
        value
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    let snapped = Point::new(snap(point.x, grid_size), snap(point.y, grid_size));
    SnapResult {
        point: snapped,
        snapped_x: snapped.x != point.x,
        snapped_y: snapped.y != point.y,
    }
}

/// Snap a point based on the current snap mode.
pub fn snap_point(point: Point, mode: SnapMode, grid_size: f64) -> SnapResult {
    if mode.snaps_to_grid() {
        snap_to_grid(point, grid_size)
    } else {
        SnapResult::none(point)
    }
}

/// Snap an angle to the nearest increment. The result is not normalised.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    snap(angle_degrees, increment)
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// A vertical line at `x = position`.
    Vertical,
    /// A horizontal line at `y = position`.
    Horizontal,
}

/// Which feature of the other item the guide lines up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    Edge,
    Center,
}

/// A transient alignment line shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentGuide {
    pub axis: GuideAxis,
    pub position: f64,
    pub kind: GuideKind,
}

/// Guides for every edge or center of `moving` that lies within `threshold`
/// of the matching edge or center of one of `others`.
///
/// Left is compared with left, right with right, center with center (and
/// likewise vertically). Duplicate guides are reported once.
pub fn compute_alignment_guides(
    moving: Rect,
    others: &[Rect],
    threshold: f64,
) -> Vec<AlignmentGuide> {
    let mut guides: Vec<AlignmentGuide> = Vec::new();
    let mut push = |guide: AlignmentGuide| {
        if !guides.contains(&guide) {
            guides.push(guide);
        }
    };

    let center = moving.center();
    for other in others {
        let other_center = other.center();
        let vertical = [
            (moving.x0, other.x0, GuideKind::Edge),
            (moving.x1, other.x1, GuideKind::Edge),
            (center.x, other_center.x, GuideKind::Center),
        ];
        let horizontal = [
            (moving.y0, other.y0, GuideKind::Edge),
            (moving.y1, other.y1, GuideKind::Edge),
            (center.y, other_center.y, GuideKind::Center),
        ];

        for (mine, theirs, kind) in vertical {
            if (mine - theirs).abs() <= threshold {
                push(AlignmentGuide {
                    axis: GuideAxis::Vertical,
                    position: theirs,
                    kind,
                });
            }
        }
        for (mine, theirs, kind) in horizontal {
            if (mine - theirs).abs() <= threshold {
                push(AlignmentGuide {
                    axis: GuideAxis::Horizontal,
                    position: theirs,
                    kind,
                });
            }
        }
    }

    guides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_value() {
        assert!((snap(37.0, 20.0) - 40.0).abs() < f64::EPSILON);
        assert!((snap(29.0, 20.0) - 20.0).abs() < f64::EPSILON);
        assert!((snap(-11.0, 20.0) - -20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_degenerate_grid_is_identity() {
        assert!((snap(37.3, 0.0) - 37.3).abs() < f64::EPSILON);
        assert!((snap(37.3, -5.0) - 37.3).abs() < f64::EPSILON);
        assert!((snap(37.3, f64::NAN) - 37.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(35.0, 47.0), GRID_SIZE);
        assert!((result.point.x - 40.0).abs() < f64::EPSILON);
        assert!((result.point.y - 40.0).abs() < f64::EPSILON);
        assert!(result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let result = snap_to_grid(Point::new(40.0, 60.0), GRID_SIZE);
        assert_eq!(result.point, Point::new(40.0, 60.0));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_is_idempotent() {
        for grid in [GRID_SIZE, 7.5, 1.0, 0.0] {
            for value in [-41.0, -10.0, -0.4, 0.0, 9.99, 10.0, 33.3, 1234.5] {
                let once = snap(value, grid);
                assert_eq!(snap(once, grid), once, "value {value} grid {grid}");
            }
        }
    }

    #[test]
    fn test_snap_mode_flags() {
        assert!(!SnapMode::None.snaps_to_grid());
        assert!(!SnapMode::None.shows_guides());
        assert!(SnapMode::Grid.snaps_to_grid());
        assert!(!SnapMode::Guides.snaps_to_grid());
        assert!(SnapMode::Guides.shows_guides());
        assert!(SnapMode::All.snaps_to_grid() && SnapMode::All.shows_guides());
    }

    #[test]
    fn test_snap_point_respects_mode() {
        let p = Point::new(33.0, 33.0);
        assert_eq!(snap_point(p, SnapMode::Guides, GRID_SIZE).point, p);
        assert_eq!(
            snap_point(p, SnapMode::Grid, GRID_SIZE).point,
            Point::new(40.0, 40.0)
        );
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(37.0, ANGLE_SNAP_INCREMENT) - 30.0).abs() < f64::EPSILON);
        assert!((snap_angle(38.0, ANGLE_SNAP_INCREMENT) - 45.0).abs() < f64::EPSILON);
        assert!((snap_angle(44.0, ANGLE_SNAP_INCREMENT) - 45.0).abs() < f64::EPSILON);
        assert!((snap_angle(-8.0, ANGLE_SNAP_INCREMENT) - -15.0).abs() < f64::EPSILON);
        assert!((snap_angle(400.0, ANGLE_SNAP_INCREMENT) - 405.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guides_left_edge_within_threshold() {
        let moving = Rect::new(102.0, 300.0, 152.0, 350.0);
        let other = Rect::new(100.0, 0.0, 200.0, 100.0);
        let guides = compute_alignment_guides(moving, &[other], GUIDE_THRESHOLD);
        assert_eq!(
            guides,
            vec![AlignmentGuide {
                axis: GuideAxis::Vertical,
                position: 100.0,
                kind: GuideKind::Edge,
            }]
        );
    }

    #[test]
    fn test_guides_center_alignment() {
        let moving = Rect::new(0.0, 48.0, 20.0, 68.0);
        let other = Rect::new(200.0, 0.0, 300.0, 120.0);
        let guides = compute_alignment_guides(moving, &[other], GUIDE_THRESHOLD);
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].axis, GuideAxis::Horizontal);
        assert_eq!(guides[0].kind, GuideKind::Center);
        assert!((guides[0].position - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guides_none_when_far() {
        let moving = Rect::new(500.0, 500.0, 550.0, 550.0);
        let other = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(compute_alignment_guides(moving, &[other], GUIDE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_guides_are_deduplicated() {
        let moving = Rect::new(0.0, 300.0, 50.0, 350.0);
        let a = Rect::new(0.0, 0.0, 80.0, 80.0);
        let b = Rect::new(0.0, 100.0, 90.0, 180.0);
        let guides = compute_alignment_guides(moving, &[a, b], GUIDE_THRESHOLD);
        assert_eq!(guides.len(), 1);
    }
}
