//! Rectangle shape.

use super::{ShapeStyle, ShapeTrait, box_attachment, box_hit, map_point, scale_factors, MIN_EXTENT};
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned (in its local frame) rectangle with optional rounded corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Top-left corner position.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
}

impl Rectangle {
    pub const DEFAULT_WIDTH: f64 = 120.0;
    pub const DEFAULT_HEIGHT: f64 = 80.0;

    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
            corner_radius: 0.0,
        }
    }

    /// Default-sized rectangle with its top-left corner on the placement origin.
    pub fn placed(origin: Point) -> Self {
        Self::new(origin, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(rect.origin(), rect.width(), rect.height())
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.width, self.height))
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.origin = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }
}

/// Flip negative extents and enforce the minimum size of a box-shaped variant.
pub(crate) fn normalize_box(origin: &mut Point, width: &mut f64, height: &mut f64) {
    if *width < 0.0 {
        origin.x += *width;
        *width = -*width;
    }
    if *height < 0.0 {
        origin.y += *height;
        *height = -*height;
    }
    *width = width.max(MIN_EXTENT);
    *height = height.max(MIN_EXTENT);
}

impl ShapeTrait for Rectangle {
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
    fn test_rectangle_from_corners() {
        let rect = Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        assert!((rect.origin.x - 50.0).abs() < f64::EPSILON);
        assert!((rect.origin.y - 50.0).abs() < f64::EPSILON);
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        let mut style = ShapeStyle::default();
        // Outline only: the interior is not hittable
        assert!(!rect.hit_test(Point::new(50.0, 50.0), &style, 0.0));
        assert!(rect.hit_test(Point::new(99.5, 50.0), &style, 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), &style, 10.0)); // Within tolerance

        style.fill_color = Some(super::super::SerializableColor::white());
        assert!(rect.hit_test(Point::new(50.0, 50.0), &style, 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), &style, 0.0));
    }

    #[test]
    fn test_bounds() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        let bounds = rect.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_finalize_flips_and_clamps() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), -20.0, 0.0);
        rect.corner_radius = 50.0;
        rect.finalize();
        assert!((rect.origin.x + 10.0).abs() < f64::EPSILON);
        assert!((rect.width - 20.0).abs() < f64::EPSILON);
        assert!((rect.height - MIN_EXTENT).abs() < f64::EPSILON);
        assert!((rect.corner_radius - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_elongated_attaches_to_pole() {
        let rect = Rectangle::new(Point::ZERO, 200.0, 40.0);
        let p = rect.attachment_point(Point::new(20.0, -30.0));
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 20.0).abs() < 1e-9);
    }
}
