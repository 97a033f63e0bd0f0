//! Viewport pan/zoom and coordinate conversion.

use crate::config::ViewportConfig;
use crate::geometry;
use crate::input::Modifiers;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The viewport manages the view transform for the board.
///
/// Every conversion goes through [`Viewport::effective_zoom`], the user
/// zoom multiplied by the render scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen-space translation of the canvas origin.
    pub pan: Vec2,
    zoom: f64,
    config: ViewportConfig,
    /// Space held: dragging pans instead of selecting.
    #[serde(skip)]
    temporary_pan: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ViewportConfig) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0_f64.clamp(config.min_zoom, config.max_zoom),
            config: config.clone(),
            temporary_pan: false,
        }
    }

    /// User zoom (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the user zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let changed = (zoom - self.zoom).abs() > f64::EPSILON;
        self.zoom = zoom;
        changed
    }

    pub fn render_scale(&self) -> f64 {
        self.config.render_scale
    }

    /// The scale between canvas units and screen pixels.
    pub fn effective_zoom(&self) -> f64 {
        self.zoom * self.config.render_scale
    }

    /// Canvas-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.effective_zoom())
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        geometry::screen_to_canvas(screen, self.pan, self.effective_zoom())
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        geometry::canvas_to_screen(canvas, self.pan, self.effective_zoom())
    }

    /// Convert a screen-space movement into canvas units.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.effective_zoom()
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.pan += delta;
        true
    }

    /// Zoom to `zoom`, keeping the canvas point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, zoom: f64) -> bool {
        let anchor = self.screen_to_canvas(screen);
        if !self.set_zoom(zoom) {
            return false;
        }
        let scaled = anchor.to_vec2() * self.effective_zoom();
        self.pan = screen.to_vec2() - scaled;
        true
    }

    /// Wheel input: with Ctrl/Cmd zoom around the pointer, otherwise pan.
    pub fn handle_wheel(&mut self, position: Point, delta: Vec2, modifiers: Modifiers) -> bool {
        if modifiers.command() {
            let factor = (-delta.y * self.config.wheel_zoom_step).exp();
            self.zoom_at(position, self.zoom * factor)
        } else {
            self.pan_by(-delta)
        }
    }

    /// Fit the board into a container of `container` screen pixels, centered.
    pub fn fit_to_bounds(&mut self, board: Size, container: Size) -> bool {
        if board.is_zero_area() || container.is_zero_area() {
            return false;
        }
        let padding = self.config.fit_padding;
        let available = Size::new(
            (container.width - padding * 2.0).max(1.0),
            (container.height - padding * 2.0).max(1.0),
        );
        let scale = (available.width / board.width).min(available.height / board.height);
        let before = (self.zoom, self.pan);
        self.set_zoom(scale / self.config.render_scale);

        let board_center = Rect::from_origin_size(Point::ZERO, board).center();
        let effective = self.effective_zoom();
        self.pan = Vec2::new(
            container.width / 2.0 - board_center.x * effective,
            container.height / 2.0 - board_center.y * effective,
        );
        before != (self.zoom, self.pan)
    }

    pub fn set_temporary_pan(&mut self, active: bool) -> bool {
        let changed = self.temporary_pan != active;
        self.temporary_pan = active;
        changed
    }

    pub fn is_temporary_pan(&self) -> bool {
        self.temporary_pan
    }

    /// Reset pan and zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.config.min_zoom, self.config.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.pan, Vec2::ZERO);
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
        assert!((viewport.effective_zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_effective_zoom_includes_render_scale() {
        let config = ViewportConfig {
            render_scale: 2.0,
            ..ViewportConfig::default()
        };
        let mut viewport = Viewport::from_config(&config);
        viewport.set_zoom(1.5);
        assert!((viewport.effective_zoom() - 3.0).abs() < EPS);
        let canvas = viewport.screen_to_canvas(Point::new(300.0, 600.0));
        assert!((canvas.x - 100.0).abs() < EPS);
        assert!((canvas.y - 200.0).abs() < EPS);
        let delta = viewport.screen_delta_to_canvas(Vec2::new(30.0, 0.0));
        assert!((delta.x - 10.0).abs() < EPS);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(30.0, -20.0);
        viewport.set_zoom(1.5);
        let original = Point::new(123.0, 456.0);
        let back = viewport.canvas_to_screen(viewport.screen_to_canvas(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
        let via_affine = viewport.transform() * viewport.screen_to_canvas(original);
        assert!((via_affine.x - original.x).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.set_zoom(0.001);
        assert!((viewport.zoom() - 0.1).abs() < f64::EPSILON);
        viewport.set_zoom(1000.0);
        assert!((viewport.zoom() - 5.0).abs() < f64::EPSILON);
        assert!(!viewport.set_zoom(f64::NAN));
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(40.0, 10.0);
        let anchor = Point::new(200.0, 150.0);
        let before = viewport.screen_to_canvas(anchor);
        assert!(viewport.zoom_at(anchor, 2.5));
        let after = viewport.screen_to_canvas(anchor);
        assert!((before.x - after.x).abs() < EPS);
        assert!((before.y - after.y).abs() < EPS);
    }

    #[test]
    fn test_wheel_pans_without_modifier() {
        let mut viewport = Viewport::new();
        assert!(viewport.handle_wheel(Point::ZERO, Vec2::new(5.0, 20.0), Modifiers::NONE));
        assert_eq!(viewport.pan, Vec2::new(-5.0, -20.0));
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_zooms_with_ctrl() {
        let mut viewport = Viewport::new();
        assert!(viewport.handle_wheel(
            Point::new(100.0, 100.0),
            Vec2::new(0.0, -100.0),
            Modifiers::ctrl(),
        ));
        assert!(viewport.zoom() > 1.0);
        let anchor = viewport.screen_to_canvas(Point::new(100.0, 100.0));
        assert!((anchor.x - 100.0).abs() < EPS);
    }

    #[test]
    fn test_fit_to_bounds_centers_board() {
        let mut viewport = Viewport::new();
        assert!(viewport.fit_to_bounds(Size::new(1600.0, 1200.0), Size::new(880.0, 1000.0)));
        // (880 - 80) / 1600 = 0.5 is the limiting scale.
        assert!((viewport.zoom() - 0.5).abs() < EPS);
        let center = viewport.canvas_to_screen(Point::new(800.0, 600.0));
        assert!((center.x - 440.0).abs() < EPS);
        assert!((center.y - 500.0).abs() < EPS);
    }

    #[test]
    fn test_temporary_pan_flag() {
        let mut viewport = Viewport::new();
        assert!(viewport.set_temporary_pan(true));
        assert!(!viewport.set_temporary_pan(true));
        assert!(viewport.is_temporary_pan());
    }
}
