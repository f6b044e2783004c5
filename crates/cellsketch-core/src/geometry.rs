//! Pure geometry helpers shared by the object model, hit-testing and routing.
//!
//! Every function here is stateless and works in document (world) coordinates.

use kurbo::{Affine, Point, Rect, Vec2};

/// Tolerance used to treat lengths and cross products as zero.
pub const GEOM_EPSILON: f64 = 1e-9;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Closest point to `point` on the segment a→b.
pub fn project_onto_segment(point: Point, a: Point, b: Point) -> Point {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < GEOM_EPSILON {
        return a;
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    distance(point, project_onto_segment(point, a, b))
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
///
/// A single-point polyline degenerates to the distance to that point; an empty
/// one is infinitely far away.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => distance(point, *only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Closest point to `point` on a polyline.
pub fn nearest_on_polyline(point: Point, points: &[Point]) -> Option<Point> {
    match points {
        [] => None,
        [only] => Some(*only),
        _ => points
            .windows(2)
            .map(|w| project_onto_segment(point, w[0], w[1]))
            .min_by(|a, b| distance(point, *a).total_cmp(&distance(point, *b))),
    }
}

/// Test if two line segments (a-b) and (c-d) intersect.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: check if an endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Corners of a rectangle in clockwise order starting at the top-left.
pub fn rect_corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// Inclusive point-in-rectangle test (points on the edges count as inside).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Inclusive overlap test of two rectangles (touching edges count).
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Test if any segment of a polyline crosses or lies inside a rectangle.
pub fn polyline_intersects_rect(points: &[Point], rect: Rect) -> bool {
    if points.iter().any(|p| rect_contains(rect, *p)) {
        return true;
    }
    let corners = rect_corners(rect);
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|&(c, d)| segments_intersect(w[0], w[1], c, d))
    })
}

/// Even-odd point-in-polygon test. The polygon is implicitly closed.
pub fn polygon_contains(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = vi.x + (point.y - vi.y) * (vj.x - vi.x) / (vj.y - vi.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Iterate the closed edges of a polygon.
fn closed_edges(vertices: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    vertices
        .iter()
        .enumerate()
        .map(move |(i, &a)| (a, vertices[(i + 1) % vertices.len()]))
}

/// Distance from a point to the outline of a closed polygon.
pub fn polygon_outline_dist(point: Point, vertices: &[Point]) -> f64 {
    closed_edges(vertices)
        .map(|(a, b)| point_to_segment_dist(point, a, b))
        .fold(f64::INFINITY, f64::min)
}

/// Closest point on the outline of a closed polygon.
pub fn nearest_on_polygon_outline(point: Point, vertices: &[Point]) -> Option<Point> {
    closed_edges(vertices)
        .map(|(a, b)| project_onto_segment(point, a, b))
        .min_by(|a, b| distance(point, *a).total_cmp(&distance(point, *b)))
}

/// Closest point on a circle's perimeter. The center maps to the top of the circle.
pub fn nearest_on_circle(point: Point, center: Point, radius: f64) -> Point {
    let dir = point - center;
    let len = dir.hypot();
    if len < GEOM_EPSILON {
        return Point::new(center.x, center.y - radius);
    }
    center + dir * (radius / len)
}

/// Rotate a point about a center by an angle in degrees (clockwise on screen, y down).
pub fn rotate_about(point: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    Affine::rotate_about(degrees.to_radians(), center) * point
}

/// Axis-aligned box of a rectangle rotated about its center.
pub fn rotated_rect_bounds(rect: Rect, degrees: f64) -> Rect {
    if degrees.rem_euclid(360.0) == 0.0 {
        return rect;
    }
    let center = rect.center();
    let rotated = rect_corners(rect).map(|p| rotate_about(p, center, degrees));
    points_bounds(&rotated).unwrap_or(rect)
}

/// Axis-aligned bounding box of a point set.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_points(*first, *first);
    for p in &points[1..] {
        rect = rect.union_pt(*p);
    }
    Some(rect)
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Angle of the vector from `center` to `point`, in degrees.
pub fn angle_degrees(center: Point, point: Point) -> f64 {
    let v: Vec2 = point - center;
    v.y.atan2(v.x).to_degrees()
}
