//! Resize/reshape handles: named control points derived from an object's geometry.

use crate::error::EditorError;
use crate::geometry::distance;
use crate::shapes::{DiagramObject, Shape};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance from the top edge to the rotation handle (in world units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    N,
    E,
    S,
    W,
}

/// Type of handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    /// First endpoint of a line-like object.
    Start,
    /// Last endpoint of a line-like object.
    End,
    /// Curvature control point of a curved path.
    Control,
    Rotate,
}

impl HandleKind {
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Corner(Corner::Nw) => "nw",
            HandleKind::Corner(Corner::Ne) => "ne",
            HandleKind::Corner(Corner::Sw) => "sw",
            HandleKind::Corner(Corner::Se) => "se",
            HandleKind::Edge(Edge::N) => "n",
            HandleKind::Edge(Edge::E) => "e",
            HandleKind::Edge(Edge::S) => "s",
            HandleKind::Edge(Edge::W) => "w",
            HandleKind::Start => "start",
            HandleKind::End => "end",
            HandleKind::Control => "control",
            HandleKind::Rotate => "rotate",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HandleKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "nw" => HandleKind::Corner(Corner::Nw),
            "ne" => HandleKind::Corner(Corner::Ne),
            "sw" => HandleKind::Corner(Corner::Sw),
            "se" => HandleKind::Corner(Corner::Se),
            "n" => HandleKind::Edge(Edge::N),
            "e" => HandleKind::Edge(Edge::E),
            "s" => HandleKind::Edge(Edge::S),
            "w" => HandleKind::Edge(Edge::W),
            "start" => HandleKind::Start,
            "end" => HandleKind::End,
            "control" => HandleKind::Control,
            "rotate" => HandleKind::Rotate,
            other => return Err(EditorError::UnknownHandle(other.to_string())),
        })
    }
}

/// A handle with its world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a world point is within `radius` (already divided by zoom).
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        distance(point, self.position) <= radius
    }
}

const CORNERS: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];
const EDGES: [Edge; 4] = [Edge::N, Edge::E, Edge::S, Edge::W];

/// Local-frame position of a corner of `bounds`.
pub fn corner_point(bounds: Rect, corner: Corner) -> Point {
    match corner {
        Corner::Nw => Point::new(bounds.x0, bounds.y0),
        Corner::Ne => Point::new(bounds.x1, bounds.y0),
        Corner::Sw => Point::new(bounds.x0, bounds.y1),
        Corner::Se => Point::new(bounds.x1, bounds.y1),
    }
}

/// Local-frame position of an edge midpoint of `bounds`.
pub fn edge_point(bounds: Rect, edge: Edge) -> Point {
    let c = bounds.center();
    match edge {
        Edge::N => Point::new(c.x, bounds.y0),
        Edge::E => Point::new(bounds.x1, c.y),
        Edge::S => Point::new(c.x, bounds.y1),
        Edge::W => Point::new(bounds.x0, c.y),
    }
}

/// The handles an object exposes, in world coordinates (rotation applied).
pub fn handles(object: &DiagramObject) -> Vec<Handle> {
    let bounds = object.shape.bounds();
    let corners = || {
        CORNERS
            .iter()
            .map(|&c| Handle::new(object.to_world(corner_point(bounds, c)), HandleKind::Corner(c)))
    };
    let edges = || {
        EDGES
            .iter()
            .map(|&e| Handle::new(object.to_world(edge_point(bounds, e)), HandleKind::Edge(e)))
    };
    let endpoints = |start: Point, end: Point| {
        [
            Handle::new(object.to_world(start), HandleKind::Start),
            Handle::new(object.to_world(end), HandleKind::End),
        ]
    };

    match &object.shape {
        Shape::Rectangle(_)
        | Shape::TextBox(_)
        | Shape::Image(_)
        | Shape::Container(_)
        | Shape::Polygon(_) => {
            let rotate = Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET);
            corners()
                .chain(edges())
                .chain(std::iter::once(Handle::new(
                    object.to_world(rotate),
                    HandleKind::Rotate,
                )))
                .collect()
        }
        Shape::Circle(_) | Shape::Freehand(_) => corners().collect(),
        Shape::Line(l) => endpoints(l.start, l.end).to_vec(),
        Shape::TaperedLine(l) => endpoints(l.start, l.end).to_vec(),
        Shape::Connector(c) => endpoints(c.source.position(), c.target.position()).to_vec(),
        Shape::CurvedPath(c) => {
            let mut list = endpoints(c.start, c.end).to_vec();
            list.push(Handle::new(object.to_world(c.control), HandleKind::Control));
            list
        }
    }
}

/// World position of one handle, if the object has it.
pub fn handle_position(object: &DiagramObject, kind: HandleKind) -> Option<Point> {
    handles(object)
        .into_iter()
        .find(|h| h.kind == kind)
        .map(|h| h.position)
}

/// The handle under `point`, nearest first. `radius` is in world units
/// (`handle_hit_radius / zoom`), so the pick area stays constant on screen.
pub fn hit_test_handle(object: &DiagramObject, point: Point, radius: f64) -> Option<HandleKind> {
    handles(object)
        .into_iter()
        .filter(|h| h.hit_test(point, radius))
        .min_by(|a, b| {
            distance(point, a.position).total_cmp(&distance(point, b.position))
        })
        .map(|h| h.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{CurvedPath, ObjectKind, Rectangle};

    #[test]
    fn test_handle_names_roundtrip() {
        for name in [
            "nw", "ne", "sw", "se", "n", "e", "s", "w", "start", "end", "control", "rotate",
        ] {
            let kind: HandleKind = name.parse().unwrap();
            assert_eq!(kind.name(), name);
        }
        assert!("middle".parse::<HandleKind>().is_err());
    }

    #[test]
    fn test_rectangle_handles() {
        let rect = DiagramObject::new(Shape::Rectangle(Rectangle::new(
            Point::new(10.0, 10.0),
            100.0,
            50.0,
        )));
        let list = handles(&rect);
        assert_eq!(list.len(), 9);
        assert_eq!(
            handle_position(&rect, HandleKind::Corner(Corner::Se)),
            Some(Point::new(110.0, 60.0))
        );
        assert_eq!(
            handle_position(&rect, HandleKind::Rotate),
            Some(Point::new(60.0, -15.0))
        );
    }

    #[test]
    fn test_line_and_curve_handles() {
        let line = DiagramObject::placed(ObjectKind::Line, Point::ZERO);
        let kinds: Vec<_> = handles(&line).into_iter().map(|h| h.kind).collect();
        assert_eq!(kinds, vec![HandleKind::Start, HandleKind::End]);

        let curve = DiagramObject::new(Shape::CurvedPath(CurvedPath::placed(Point::ZERO)));
        assert_eq!(
            handle_position(&curve, HandleKind::Control),
            Some(Point::new(60.0, -40.0))
        );
    }

    #[test]
    fn test_circle_has_corners_only() {
        let circle = DiagramObject::placed(ObjectKind::Circle, Point::ZERO);
        assert_eq!(handles(&circle).len(), 4);
        assert!(handle_position(&circle, HandleKind::Rotate).is_none());
    }

    #[test]
    fn test_handles_follow_rotation() {
        let rect = DiagramObject::new(Shape::Rectangle(Rectangle::new(Point::ZERO, 100.0, 100.0)))
            .with_rotation(90.0);
        // Top-left corner of a square rotated a quarter turn lands on the top-right
        let nw = handle_position(&rect, HandleKind::Corner(Corner::Nw)).unwrap();
        assert!((nw.x - 100.0).abs() < 1e-9);
        assert!(nw.y.abs() < 1e-9);
    }

    #[test]
    fn test_hit_radius_is_zoom_scaled_by_caller() {
        let rect = DiagramObject::new(Shape::Rectangle(Rectangle::new(Point::ZERO, 100.0, 100.0)));
        let near_corner = Point::new(103.0, 103.0);
        // 8px at zoom 1 covers the corner; at zoom 4 the world radius is 2
        assert_eq!(
            hit_test_handle(&rect, near_corner, 8.0 / 1.0),
            Some(HandleKind::Corner(Corner::Se))
        );
        assert_eq!(hit_test_handle(&rect, near_corner, 8.0 / 4.0), None);
    }
}
