//! Connection router: turns two endpoints and a route style into a path, and
//! samples positions along it for signal playback.

use crate::geometry::{
    GEOM_EPSILON, distance, nearest_on_polyline, points_bounds, point_to_polyline_dist,
};
use kurbo::{
    BezPath, ParamCurve, ParamCurveArclen, ParamCurveExtrema, ParamCurveNearest, Point, QuadBez,
    Rect, Vec2,
};
use serde::{Deserialize, Serialize};

/// Accuracy for arc-length and nearest-point queries on curved routes.
const CURVE_ACCURACY: f64 = 1e-4;

/// Number of segments used when a curved route is flattened.
const FLATTEN_SEGMENTS: usize = 16;

/// Default bend of curved routes as a fraction of the chord length.
pub const DEFAULT_CURVATURE: f64 = 0.25;

/// How a connector travels between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStyle {
    #[default]
    Straight,
    Curved,
    Elbow,
}

impl RouteStyle {
    pub fn name(self) -> &'static str {
        match self {
            RouteStyle::Straight => "straight",
            RouteStyle::Curved => "curved",
            RouteStyle::Elbow => "elbow",
        }
    }
}

/// A computed connector path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorPath {
    /// Straight or orthogonal route through the given vertices.
    Polyline(Vec<Point>),
    /// Single quadratic bend.
    Quad(QuadBez),
}

/// Compute the path between two endpoints.
///
/// `curvature` only affects curved routes: the control point sits
/// `curvature × chord length` from the chord midpoint along the left normal.
pub fn route(start: Point, end: Point, style: RouteStyle, curvature: f64) -> ConnectorPath {
    match style {
        RouteStyle::Straight => ConnectorPath::Polyline(vec![start, end]),
        RouteStyle::Curved => {
            let chord = end - start;
            let normal = Vec2::new(chord.y, -chord.x);
            let control = start.midpoint(end) + normal * curvature;
            ConnectorPath::Quad(QuadBez::new(start, control, end))
        }
        RouteStyle::Elbow => {
            let mid = start.midpoint(end);
            let delta = end - start;
            let points = if delta.x.abs() >= delta.y.abs() {
                vec![start, Point::new(mid.x, start.y), Point::new(mid.x, end.y), end]
            } else {
                vec![start, Point::new(start.x, mid.y), Point::new(end.x, mid.y), end]
            };
            ConnectorPath::Polyline(points)
        }
    }
}

impl ConnectorPath {
    /// Total arc length.
    pub fn length(&self) -> f64 {
        match self {
            ConnectorPath::Polyline(points) => {
                points.windows(2).map(|w| distance(w[0], w[1])).sum()
            }
            ConnectorPath::Quad(quad) => quad.arclen(CURVE_ACCURACY),
        }
    }

    pub fn start(&self) -> Point {
        match self {
            ConnectorPath::Polyline(points) => points.first().copied().unwrap_or(Point::ZERO),
            ConnectorPath::Quad(quad) => quad.p0,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            ConnectorPath::Polyline(points) => points.last().copied().unwrap_or(Point::ZERO),
            ConnectorPath::Quad(quad) => quad.p2,
        }
    }

    /// Point at fraction `t` of the arc length (clamped to [0, 1]).
    pub fn point_at(&self, t: f64) -> Point {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let total = self.length();
        if total < GEOM_EPSILON {
            return self.start();
        }
        match self {
            ConnectorPath::Polyline(points) => {
                let mut remaining = t * total;
                for w in points.windows(2) {
                    let seg = distance(w[0], w[1]);
                    if remaining <= seg {
                        if seg < GEOM_EPSILON {
                            return w[0];
                        }
                        return w[0].lerp(w[1], remaining / seg);
                    }
                    remaining -= seg;
                }
                self.end()
            }
            ConnectorPath::Quad(quad) => {
                let param = quad.inv_arclen(t * total, CURVE_ACCURACY);
                quad.eval(param)
            }
        }
    }

    /// Closest point on the path.
    pub fn nearest_point(&self, point: Point) -> Point {
        match self {
            ConnectorPath::Polyline(points) => {
                nearest_on_polyline(point, points).unwrap_or(point)
            }
            ConnectorPath::Quad(quad) => quad.eval(quad.nearest(point, CURVE_ACCURACY).t),
        }
    }

    pub fn distance_to(&self, point: Point) -> f64 {
        match self {
            ConnectorPath::Polyline(points) => point_to_polyline_dist(point, points),
            ConnectorPath::Quad(quad) => quad.nearest(point, CURVE_ACCURACY).distance_sq.sqrt(),
        }
    }

    /// Tight axis-aligned bounds of the path itself.
    pub fn bounds(&self) -> Rect {
        match self {
            ConnectorPath::Polyline(points) => {
                points_bounds(points).unwrap_or(Rect::ZERO)
            }
            ConnectorPath::Quad(quad) => ParamCurveExtrema::bounding_box(quad),
        }
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        match self {
            ConnectorPath::Polyline(points) => {
                if let Some((first, rest)) = points.split_first() {
                    path.move_to(*first);
                    for p in rest {
                        path.line_to(*p);
                    }
                }
            }
            ConnectorPath::Quad(quad) => {
                path.move_to(quad.p0);
                path.quad_to(quad.p1, quad.p2);
            }
        }
        path
    }

    /// Vertices of a polyline approximation (exact for polyline routes).
    pub fn points(&self) -> Vec<Point> {
        match self {
            ConnectorPath::Polyline(points) => points.clone(),
            ConnectorPath::Quad(quad) => (0..=FLATTEN_SEGMENTS)
                .map(|i| quad.eval(i as f64 / FLATTEN_SEGMENTS as f64))
                .collect(),
        }
    }

    /// Unit direction of travel at the end of the path, for arrow heads.
    pub fn end_direction(&self) -> Vec2 {
        let (from, to) = match self {
            ConnectorPath::Polyline(points) => {
                let n = points.len();
                if n < 2 {
                    return Vec2::new(1.0, 0.0);
                }
                // Skip zero-length trailing segments of elbow routes
                let to = points[n - 1];
                let from = points[..n - 1]
                    .iter()
                    .rev()
                    .find(|p| distance(**p, to) > GEOM_EPSILON)
                    .copied()
                    .unwrap_or(points[0]);
                (from, to)
            }
            ConnectorPath::Quad(quad) => (quad.p1, quad.p2),
        };
        let dir = to - from;
        let len = dir.hypot();
        if len < GEOM_EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            dir / len
        }
    }
}
