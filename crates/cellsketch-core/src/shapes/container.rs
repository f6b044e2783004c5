//! Container shape: a titled frame (compartment, cell, plot area) that other
//! objects are laid out inside.

use super::{ShapeStyle, ShapeTrait, box_attachment, box_hit, map_point, scale_factors};
use super::rectangle::normalize_box;
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// What the container frame represents, for the renderer's decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Plain compartment frame.
    #[default]
    Frame,
    /// Plot area with axes.
    Graph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub kind: ContainerKind,
    #[serde(default)]
    pub corner_radius: f64,
}

impl Container {
    pub const DEFAULT_WIDTH: f64 = 320.0;
    pub const DEFAULT_HEIGHT: f64 = 240.0;

    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
            title: String::new(),
            kind: ContainerKind::default(),
            corner_radius: 0.0,
        }
    }

    pub fn placed(origin: Point) -> Self {
        Self::new(origin, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.width, self.height))
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.origin = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }
}

impl ShapeTrait for Container {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        box_hit(self.as_rect(), point, style, tolerance, false)
    }

    fn attachment_point(&self, near: Point) -> Point {
        box_attachment(self.as_rect(), near)
    }

    fn to_path(&self) -> BezPath {
        if self.corner_radius > 0.0 {
            RoundedRect::from_rect(self.as_rect(), self.corner_radius).to_path(0.1)
        } else {
            self.as_rect().to_path(0.1)
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        let (sx, sy) = scale_factors(from, to);
        self.origin = map_point(self.origin, from, to);
        self.width *= sx;
        self.height *= sy;
    }

    fn finalize(&mut self) {
        normalize_box(&mut self.origin, &mut self.width, &mut self.height);
        let max_radius = self.width.min(self.height) / 2.0;
        self.corner_radius = if self.corner_radius.is_finite() {
            self.corner_radius.clamp(0.0, max_radius)
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interior_passes_through() {
        let container = Container::placed(Point::ZERO);
        let style = ShapeStyle::default();
        assert!(!container.hit_test(Point::new(160.0, 120.0), &style, 4.0));
        assert!(container.hit_test(Point::new(0.0, 120.0), &style, 4.0));
    }

    #[test]
    fn test_kind_defaults_to_frame() {
        let json = r#"{"origin":{"x":0.0,"y":0.0},"width":10.0,"height":10.0}"#;
        let container: Container = serde_json::from_str(json).unwrap();
        assert_eq!(container.kind, ContainerKind::Frame);
    }
}
