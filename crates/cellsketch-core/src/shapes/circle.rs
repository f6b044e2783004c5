//! Circle shape.

use super::{ShapeStyle, ShapeTrait, closed_hit, map_point, scale_factors, MIN_EXTENT};
use crate::geometry::{distance, nearest_on_circle};
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// A circle given by its center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub const DEFAULT_RADIUS: f64 = 40.0;

    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Default-sized circle centered on the placement origin.
    pub fn placed(origin: Point) -> Self {
        Self::new(origin, Self::DEFAULT_RADIUS)
    }
}

impl ShapeTrait for Circle {
    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius * 2.0, self.radius * 2.0))
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        let from_center = distance(point, self.center);
        let inside = from_center <= self.radius;
        closed_hit(inside, (from_center - self.radius).abs(), style, tolerance, false)
    }

    fn attachment_point(&self, near: Point) -> Point {
        nearest_on_circle(near, self.center, self.radius)
    }

    fn to_path(&self) -> BezPath {
        KurboCircle::new(self.center, self.radius).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        let (sx, sy) = scale_factors(from, to);
        self.center = map_point(self.center, from, to);
        self.radius *= sx.abs().min(sy.abs());
    }

    fn finalize(&mut self) {
        self.radius = self.radius.abs().max(MIN_EXTENT);
    }
}
