//! Editor configuration.

use crate::error::{EditorError, EditorResult};
use crate::hit_test::HitMode;
use crate::routing::RouteStyle;
use crate::shapes::ShapeStyle;
use crate::viewport::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use serde::{Deserialize, Serialize};

/// Tunables of the editor engine. Every field has a default, so partial JSON
/// documents load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history entries kept for undo.
    pub history_capacity: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Handle pick radius in screen pixels.
    pub handle_hit_radius: f64,
    /// Object pick tolerance in screen pixels.
    pub hit_tolerance: f64,
    pub default_hit_mode: HitMode,
    /// Step for discrete rotation snapping, in degrees.
    pub rotation_snap_degrees: f64,
    /// Pointer travel (screen pixels) below which a press/release is a click.
    pub click_threshold: f64,
    /// RDP tolerance for freehand strokes in world units (0 disables).
    pub freehand_simplify_tolerance: f64,
    /// Style given to newly drawn objects.
    pub default_style: ShapeStyle,
    /// Route style of newly placed connectors.
    pub default_route: RouteStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            handle_hit_radius: 8.0,
            hit_tolerance: 4.0,
            default_hit_mode: HitMode::Loose,
            rotation_snap_degrees: 15.0,
            click_threshold: 3.0,
            freehand_simplify_tolerance: 0.5,
            default_style: ShapeStyle::default(),
            default_route: RouteStyle::Straight,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> EditorResult<()> {
        if self.history_capacity == 0 {
            return Err(EditorError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) || self.min_zoom <= 0.0 {
            return Err(EditorError::InvalidConfig(format!(
                "zoom range must be positive and finite, got [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(EditorError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        let non_negative = [
            ("handle_hit_radius", self.handle_hit_radius),
            ("hit_tolerance", self.hit_tolerance),
            ("rotation_snap_degrees", self.rotation_snap_degrees),
            ("click_threshold", self.click_threshold),
            ("freehand_simplify_tolerance", self.freehand_simplify_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EditorError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
