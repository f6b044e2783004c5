//! Tapered line: a segment whose painted width varies linearly from start to end.

use super::{ShapeStyle, ShapeTrait, enforce_min_length, map_point};
use crate::geometry::{GEOM_EPSILON, distance, project_onto_segment};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaperedLine {
    pub start: Point,
    pub end: Point,
    pub start_width: f64,
    pub end_width: f64,
}

impl TaperedLine {
    pub const DEFAULT_LENGTH: f64 = 120.0;
    pub const DEFAULT_START_WIDTH: f64 = 12.0;
    pub const DEFAULT_END_WIDTH: f64 = 2.0;
    pub const MIN_WIDTH: f64 = 0.5;

    pub fn new(start: Point, end: Point, start_width: f64, end_width: f64) -> Self {
        Self {
            start,
            end,
            start_width,
            end_width,
        }
    }

    pub fn placed(origin: Point) -> Self {
        Self::new(
            origin,
            origin + Vec2::new(Self::DEFAULT_LENGTH, 0.0),
            Self::DEFAULT_START_WIDTH,
            Self::DEFAULT_END_WIDTH,
        )
    }

    pub fn max_width(&self) -> f64 {
        self.start_width.max(self.end_width).max(0.0)
    }

    /// Painted width at parameter `t` along the centerline.
    pub fn width_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        self.start_width + (self.end_width - self.start_width) * t
    }

    /// Parameter of the centerline point closest to `point`.
    fn param_of(&self, point: Point) -> f64 {
        let seg = self.end - self.start;
        let len_sq = seg.hypot2();
        if len_sq < GEOM_EPSILON {
            return 0.0;
        }
        ((point - self.start).dot(seg) / len_sq).clamp(0.0, 1.0)
    }
}

impl ShapeTrait for TaperedLine {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn stroke_margin(&self, _style: &ShapeStyle) -> f64 {
        self.max_width() / 2.0
    }

    fn hit_test(&self, point: Point, _style: &ShapeStyle, tolerance: f64) -> bool {
        let t = self.param_of(point);
        let on_center = self.start + (self.end - self.start) * t;
        distance(point, on_center) <= self.width_at(t) / 2.0 + tolerance
    }

    fn attachment_point(&self, near: Point) -> Point {
        project_onto_segment(near, self.start, self.end)
    }

    /// Closed outline of the tapered body.
    fn to_path(&self) -> BezPath {
        let dir = self.end - self.start;
        let len = dir.hypot();
        let mut path = BezPath::new();
        if len < GEOM_EPSILON {
            return path;
        }
        let normal = Vec2::new(-dir.y / len, dir.x / len);
        let half_start = normal * (self.start_width / 2.0);
        let half_end = normal * (self.end_width / 2.0);
        path.move_to(self.start + half_start);
        path.line_to(self.end + half_end);
        path.line_to(self.end - half_end);
        path.line_to(self.start - half_start);
        path.close_path();
        path
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
        let clamp_width = |w: f64| if w.is_finite() { w.max(Self::MIN_WIDTH) } else { Self::MIN_WIDTH };
        self.start_width = clamp_width(self.start_width);
        self.end_width = clamp_width(self.end_width);
    }

    fn is_line_like(&self) -> bool {
        true
    }

    fn endpoints(&self) -> Option<(Point, Point)> {
        Some((self.start, self.end))
    }
}
