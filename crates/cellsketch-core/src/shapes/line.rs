//! Straight line segment shape.

use super::{ShapeStyle, ShapeTrait, enforce_min_length, map_point};
use crate::geometry::{point_to_segment_dist, project_onto_segment};
use kurbo::{BezPath, Line as KurboLine, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// A straight segment from `start` to `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const DEFAULT_LENGTH: f64 = 100.0;

    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Default horizontal line starting at the placement origin.
    pub fn placed(origin: Point) -> Self {
        Self::new(origin, origin + Vec2::new(Self::DEFAULT_LENGTH, 0.0))
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }
}

impl ShapeTrait for Line {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn stroke_margin(&self, style: &ShapeStyle) -> f64 {
        style.half_stroke()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start, self.end) <= style.half_stroke() + tolerance
    }

    fn attachment_point(&self, near: Point) -> Point {
        project_onto_segment(near, self.start, self.end)
    }

    fn to_path(&self) -> BezPath {
        KurboLine::new(self.start, self.end).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        self.start = map_point(self.start, from, to);
        self.end = map_point(self.end, from, to);
    }

    fn finalize(&mut self) {
        enforce_min_length(self.start, &mut self.end);
    }

    fn is_line_like(&self) -> bool {
        true
    }

    fn endpoints(&self) -> Option<(Point, Point)> {
        Some((self.start, self.end))
    }
}
