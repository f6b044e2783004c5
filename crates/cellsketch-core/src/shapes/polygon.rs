//! Regular N-sided polygon shape.

use super::{ShapeStyle, ShapeTrait, closed_hit, map_point, scale_factors, MIN_EXTENT};
use crate::geometry::{
    nearest_on_polygon_outline, points_bounds, polygon_contains, polygon_outline_dist,
};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// A regular polygon inscribed in an ellipse, first vertex pointing up.
///
/// Non-uniform resizing stretches the polygon, so the two radii can differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub sides: u32,
}

impl Polygon {
    pub const DEFAULT_SIDES: u32 = 6;
    pub const DEFAULT_RADIUS: f64 = 50.0;
    pub const MIN_SIDES: u32 = 3;
    pub const MAX_SIDES: u32 = 64;

    pub fn new(center: Point, radius: f64, sides: u32) -> Self {
        Self {
            center,
            radius_x: radius,
            radius_y: radius,
            sides,
        }
    }

    /// Default hexagon centered on the placement origin.
    pub fn placed(origin: Point) -> Self {
        Self::new(origin, Self::DEFAULT_RADIUS, Self::DEFAULT_SIDES)
    }

    /// Vertex positions, clockwise on screen starting from the top.
    pub fn vertices(&self) -> Vec<Point> {
        let n = self.sides.clamp(Self::MIN_SIDES, Self::MAX_SIDES);
        (0..n)
            .map(|i| {
                let angle = -FRAC_PI_2 + TAU * f64::from(i) / f64::from(n);
                Point::new(
                    self.center.x + self.radius_x * angle.cos(),
                    self.center.y + self.radius_y * angle.sin(),
                )
            })
            .collect()
    }
}

impl ShapeTrait for Polygon {
    fn bounds(&self) -> Rect {
        points_bounds(&self.vertices()).unwrap_or(Rect::from_points(self.center, self.center))
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        let vertices = self.vertices();
        let inside = polygon_contains(point, &vertices);
        closed_hit(inside, polygon_outline_dist(point, &vertices), style, tolerance, false)
    }

    fn attachment_point(&self, near: Point) -> Point {
        nearest_on_polygon_outline(near, &self.vertices()).unwrap_or(self.center)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let vertices = self.vertices();
        if let Some((first, rest)) = vertices.split_first() {
            path.move_to(*first);
            for v in rest {
                path.line_to(*v);
            }
            path.close_path();
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        let (sx, sy) = scale_factors(from, to);
        self.center = map_point(self.center, from, to);
        self.radius_x *= sx;
        self.radius_y *= sy;
    }

    fn finalize(&mut self) {
        self.sides = self.sides.clamp(Self::MIN_SIDES, Self::MAX_SIDES);
        self.radius_x = self.radius_x.abs().max(MIN_EXTENT);
        self.radius_y = self.radius_y.abs().max(MIN_EXTENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexagon_vertices() {
        let hex = Polygon::placed(Point::ZERO);
        let vertices = hex.vertices();
        assert_eq!(vertices.len(), 6);
        assert!(vertices[0].x.abs() < 1e-9);
        assert!((vertices[0].y + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_follow_vertices() {
        let hex = Polygon::placed(Point::ZERO);
        let bounds = hex.bounds();
        assert!((bounds.height() - 100.0).abs() < 1e-9);
        assert!((bounds.width() - 100.0 * (3.0_f64).sqrt() / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_clamps_sides() {
        let mut tri = Polygon::new(Point::ZERO, 10.0, 1);
        tri.finalize();
        assert_eq!(tri.sides, 3);
        let mut many = Polygon::new(Point::ZERO, 10.0, 500);
        many.finalize();
        assert_eq!(many.sides, 64);
    }

    #[test]
    fn test_hit_and_attachment() {
        let mut style = ShapeStyle::default();
        style.fill_color = Some(super::super::SerializableColor::white());
        let hex = Polygon::placed(Point::ZERO);
        assert!(hex.hit_test(Point::ZERO, &style, 0.0));
        assert!(!hex.hit_test(Point::new(80.0, 0.0), &style, 2.0));
        let p = hex.attachment_point(Point::new(0.0, -100.0));
        assert!((p.y + 50.0).abs() < 1e-9);
    }
}
