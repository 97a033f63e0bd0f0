//! Board and viewport configuration.

use crate::history::MAX_UNDO_HISTORY;
use crate::item::MIN_ITEM_SIZE;
use crate::snap::{GRID_SIZE, GUIDE_THRESHOLD, SnapMode};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default board dimensions in canvas units.
pub const DEFAULT_BOARD_SIZE: Size = Size::new(1600.0, 1200.0);

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Zoom limits and input tuning for the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Extra scale applied on top of the user zoom (e.g. device pixels).
    pub render_scale: f64,
    /// Zoom change per wheel delta unit.
    pub wheel_zoom_step: f64,
    /// Screen padding kept around the board when fitting it to the view.
    pub fit_padding: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            render_scale: 1.0,
            wheel_zoom_step: 0.001,
            fit_padding: 40.0,
        }
    }
}

/// Everything the board needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub board_size: Size,
    pub snap_mode: SnapMode,
    pub grid_size: f64,
    /// Distance within which alignment guides appear.
    pub guide_threshold: f64,
    pub constrain_to_bounds: bool,
    /// How far items may extend past the board edges.
    pub bounds_margin: f64,
    pub min_item_size: f64,
    pub history_capacity: usize,
    /// Offset applied to duplicated items (canvas units).
    pub duplicate_offset: f64,
    /// Offset applied to pasted items (canvas units).
    pub paste_offset: f64,
    /// Rubber bands smaller than this are treated as plain clicks.
    pub rubber_band_threshold: f64,
    pub viewport: ViewportConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            snap_mode: SnapMode::Guides,
            grid_size: GRID_SIZE,
            guide_threshold: GUIDE_THRESHOLD,
            constrain_to_bounds: true,
            bounds_margin: 0.0,
            min_item_size: MIN_ITEM_SIZE,
            history_capacity: MAX_UNDO_HISTORY,
            duplicate_offset: 20.0,
            paste_offset: 40.0,
            rubber_band_threshold: 5.0,
            viewport: ViewportConfig::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl BoardConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the interaction core cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        let size = self.board_size;
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(invalid("board_size", "must be positive"));
        }
        if !self.grid_size.is_finite() || self.grid_size < 0.0 {
            return Err(invalid("grid_size", "must be zero or positive"));
        }
        if !self.min_item_size.is_finite() || self.min_item_size <= 0.0 {
            return Err(invalid("min_item_size", "must be positive"));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity", "must hold at least one entry"));
        }
        if !self.bounds_margin.is_finite() || self.bounds_margin < 0.0 {
            return Err(invalid("bounds_margin", "must be zero or positive"));
        }
        let vp = &self.viewport;
        if !(vp.min_zoom > 0.0 && vp.min_zoom <= vp.max_zoom && vp.max_zoom.is_finite()) {
            return Err(invalid(
                "viewport.zoom",
                format!("expected 0 < min ({}) <= max ({})", vp.min_zoom, vp.max_zoom),
            ));
        }
        if !(vp.render_scale > 0.0 && vp.render_scale.is_finite()) {
            return Err(invalid("viewport.render_scale", "must be positive"));
        }
        Ok(())
    }
}
