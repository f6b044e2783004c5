//! Freehand drawing shape.

use super::{ShapeStyle, ShapeTrait, map_point, MIN_EXTENT};
use crate::geometry::{
    nearest_on_polyline, point_to_polyline_dist, point_to_segment_dist, points_bounds,
};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand drawing (series of points).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Freehand {
    /// Points in the freehand path.
    pub points: Vec<Point>,
}

impl Freehand {
    /// Start a stroke at the placement origin.
    pub fn placed(origin: Point) -> Self {
        Self::from_points(vec![origin])
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Add a point to the path, skipping exact repeats of the last sample.
    pub fn add_point(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Simplify the path by removing redundant points.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 || tolerance <= 0.0 {
            return;
        }

        // Ramer-Douglas-Peucker algorithm
        self.points = rdp_simplify(&self.points, tolerance);
    }
}

/// Ramer-Douglas-Peucker line simplification.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Find point with maximum distance from the chord between first and last
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = point_to_segment_dist(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);

        // Combine, removing duplicate point at junction
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

impl ShapeTrait for Freehand {
    fn bounds(&self) -> Rect {
        points_bounds(&self.points).unwrap_or(Rect::ZERO)
    }

    fn stroke_margin(&self, style: &ShapeStyle) -> f64 {
        style.half_stroke()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= style.half_stroke() + tolerance
    }

    fn attachment_point(&self, near: Point) -> Point {
        nearest_on_polyline(near, &self.points).unwrap_or(near)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if let Some((first, rest)) = self.points.split_first() {
            path.move_to(*first);
            for point in rest {
                path.line_to(*point);
            }
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        for point in &mut self.points {
            *point = map_point(*point, from, to);
        }
    }

    fn finalize(&mut self) {
        self.points.dedup();
        match self.points.len() {
            0 => self.points = vec![Point::ZERO, Point::new(MIN_EXTENT, 0.0)],
            1 => {
                let p = self.points[0];
                self.points.push(p + Vec2::new(MIN_EXTENT, 0.0));
            }
            _ => {}
        }
    }

    fn is_line_like(&self) -> bool {
        true
    }

    fn endpoints(&self) -> Option<(Point, Point)> {
        Some((*self.points.first()?, *self.points.last()?))
    }
}
