//! Curved path: a quadratic Bézier with a draggable control point.

use super::{ShapeStyle, ShapeTrait, enforce_min_length, map_point};
use kurbo::{
    BezPath, ParamCurve, ParamCurveExtrema, ParamCurveNearest, Point, QuadBez, Rect, Vec2,
};
use serde::{Deserialize, Serialize};

/// Accuracy used for nearest-point queries on the curve.
const NEAREST_ACCURACY: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvedPath {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl CurvedPath {
    pub const DEFAULT_LENGTH: f64 = 120.0;
    /// Default bend as a fraction of the chord length (40 for the default 120 chord).
    pub const DEFAULT_BEND: f64 = 1.0 / 3.0;

    pub fn new(start: Point, control: Point, end: Point) -> Self {
        Self {
            start,
            control,
            end,
        }
    }

    pub fn placed(origin: Point) -> Self {
        Self::through(origin, origin + Vec2::new(Self::DEFAULT_LENGTH, 0.0))
    }

    /// Curve between two points bowed to the left of the chord by the default bend.
    pub fn through(start: Point, end: Point) -> Self {
        let chord = end - start;
        // Left normal in screen space (y down): (dy, -dx)
        let normal = Vec2::new(chord.y, -chord.x);
        let control = start.midpoint(end) + normal * Self::DEFAULT_BEND;
        Self::new(start, control, end)
    }

    pub fn as_quad(&self) -> QuadBez {
        QuadBez::new(self.start, self.control, self.end)
    }
}

impl ShapeTrait for CurvedPath {
    fn bounds(&self) -> Rect {
        ParamCurveExtrema::bounding_box(&self.as_quad())
    }

    fn stroke_margin(&self, style: &ShapeStyle) -> f64 {
        style.half_stroke()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        let nearest = self.as_quad().nearest(point, NEAREST_ACCURACY);
        nearest.distance_sq.sqrt() <= style.half_stroke() + tolerance
    }

    fn attachment_point(&self, near: Point) -> Point {
        let quad = self.as_quad();
        quad.eval(quad.nearest(near, NEAREST_ACCURACY).t)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.quad_to(self.control, self.end);
        path
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.control += delta;
        self.end += delta;
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        self.start = map_point(self.start, from, to);
        self.control = map_point(self.control, from, to);
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
