//! Object model: every placeable diagram entity.
//!
//! A [`DiagramObject`] carries the fields common to all variants (identity,
//! rotation, style, host link) around a [`Shape`], the closed set of geometric
//! variants. Each variant lives in its own module and implements [`ShapeTrait`];
//! [`Shape`] dispatches to it with exhaustive matches.
//!
//! Shape geometry is expressed in the object's local frame: the unrotated frame
//! whose pivot is the center of the shape's bounds. [`DiagramObject`] converts
//! between that frame and world space.

mod circle;
mod connector;
mod container;
mod curved_path;
mod draft;
mod freehand;
mod image;
mod line;
mod polygon;
mod rectangle;
mod style;
mod tapered_line;
mod text_box;

pub use circle::Circle;
pub use connector::{AttachmentPoint, Connector, ConnectorHead, EndpointRole};
pub use container::{Container, ContainerKind};
pub use curved_path::CurvedPath;
pub use draft::Draft;
pub use freehand::Freehand;
pub use image::Image;
pub use line::Line;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use style::{SerializableColor, ShapeStyle, StrokeStyle};
pub use tapered_line::TaperedLine;
pub use text_box::{FontWeight, TextAlign, TextBox};

use crate::geometry::{
    GEOM_EPSILON, distance, nearest_on_polygon_outline, polygon_outline_dist, rect_contains,
    rect_corners, rects_overlap, rotate_about, rotated_rect_bounds, normalize_degrees,
};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for diagram objects.
pub type ObjectId = Uuid;

/// Smallest size or length any variant is finalized to.
pub const MIN_EXTENT: f64 = 1.0;

/// Closed shapes at least this many times longer than wide attach at their poles.
pub const ELONGATED_ASPECT: f64 = 2.0;

/// Common trait for all shape variants. All points are in the local frame.
pub trait ShapeTrait {
    /// Tight bounds of the geometry, without any stroke.
    fn bounds(&self) -> Rect;

    /// Margin around [`ShapeTrait::bounds`] covered by the painted stroke.
    /// Closed shapes paint their stroke inside the outline.
    fn stroke_margin(&self, _style: &ShapeStyle) -> f64 {
        0.0
    }

    /// Exact hit test.
    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool;

    /// Point on the shape a connector endpoint anchors to when placed near `near`.
    fn attachment_point(&self, near: Point) -> Point;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    fn translate(&mut self, delta: Vec2);

    /// Map the geometry so that the `from` box lands on the `to` box.
    fn scale_to_bounds(&mut self, from: Rect, to: Rect);

    /// Variant-specific normalization. Idempotent.
    fn finalize(&mut self);

    fn is_line_like(&self) -> bool {
        false
    }

    /// First and last point of line-like variants.
    fn endpoints(&self) -> Option<(Point, Point)> {
        None
    }
}

/// Enum wrapper for all shape variants (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
    Line(Line),
    TaperedLine(TaperedLine),
    CurvedPath(CurvedPath),
    Freehand(Freehand),
    TextBox(TextBox),
    Image(Image),
    Container(Container),
    Connector(Connector),
}

/// Variant tag of a [`Shape`], used to pick constructors and handle sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Circle,
    Rectangle,
    Polygon,
    Line,
    TaperedLine,
    CurvedPath,
    Freehand,
    TextBox,
    Image,
    Container,
    Connector,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Circle => "circle",
            ObjectKind::Rectangle => "rectangle",
            ObjectKind::Polygon => "polygon",
            ObjectKind::Line => "line",
            ObjectKind::TaperedLine => "tapered_line",
            ObjectKind::CurvedPath => "curved_path",
            ObjectKind::Freehand => "freehand",
            ObjectKind::TextBox => "text_box",
            ObjectKind::Image => "image",
            ObjectKind::Container => "container",
            ObjectKind::Connector => "connector",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Shape {
    /// Construct a variant at `origin` with its default dimensions.
    pub fn placed(kind: ObjectKind, origin: Point) -> Self {
        match kind {
            ObjectKind::Circle => Shape::Circle(Circle::placed(origin)),
            ObjectKind::Rectangle => Shape::Rectangle(Rectangle::placed(origin)),
            ObjectKind::Polygon => Shape::Polygon(Polygon::placed(origin)),
            ObjectKind::Line => Shape::Line(Line::placed(origin)),
            ObjectKind::TaperedLine => Shape::TaperedLine(TaperedLine::placed(origin)),
            ObjectKind::CurvedPath => Shape::CurvedPath(CurvedPath::placed(origin)),
            ObjectKind::Freehand => Shape::Freehand(Freehand::placed(origin)),
            ObjectKind::TextBox => Shape::TextBox(TextBox::placed(origin)),
            ObjectKind::Image => Shape::Image(Image::placed(origin)),
            ObjectKind::Container => Shape::Container(Container::placed(origin)),
            ObjectKind::Connector => Shape::Connector(Connector::placed(origin)),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Shape::Circle(_) => ObjectKind::Circle,
            Shape::Rectangle(_) => ObjectKind::Rectangle,
            Shape::Polygon(_) => ObjectKind::Polygon,
            Shape::Line(_) => ObjectKind::Line,
            Shape::TaperedLine(_) => ObjectKind::TaperedLine,
            Shape::CurvedPath(_) => ObjectKind::CurvedPath,
            Shape::Freehand(_) => ObjectKind::Freehand,
            Shape::TextBox(_) => ObjectKind::TextBox,
            Shape::Image(_) => ObjectKind::Image,
            Shape::Container(_) => ObjectKind::Container,
            Shape::Connector(_) => ObjectKind::Connector,
        }
    }

    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Circle(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Line(s) => s,
            Shape::TaperedLine(s) => s,
            Shape::CurvedPath(s) => s,
            Shape::Freehand(s) => s,
            Shape::TextBox(s) => s,
            Shape::Image(s) => s,
            Shape::Container(s) => s,
            Shape::Connector(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Circle(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Line(s) => s,
            Shape::TaperedLine(s) => s,
            Shape::CurvedPath(s) => s,
            Shape::Freehand(s) => s,
            Shape::TextBox(s) => s,
            Shape::Image(s) => s,
            Shape::Container(s) => s,
            Shape::Connector(s) => s,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn stroke_margin(&self, style: &ShapeStyle) -> f64 {
        self.as_trait().stroke_margin(style)
    }

    pub fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, style, tolerance)
    }

    pub fn attachment_point(&self, near: Point) -> Point {
        self.as_trait().attachment_point(near)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_trait().to_path()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    pub fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        self.as_trait_mut().scale_to_bounds(from, to);
    }

    pub fn finalize(&mut self) {
        self.as_trait_mut().finalize();
    }

    pub fn is_line_like(&self) -> bool {
        self.as_trait().is_line_like()
    }

    pub fn endpoints(&self) -> Option<(Point, Point)> {
        self.as_trait().endpoints()
    }
}

/// A placed object: common fields around a shape variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramObject {
    pub(crate) id: ObjectId,
    /// Rotation in degrees, clockwise on screen, about the center of the bounds.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ShapeStyle,
    /// Object this one is anchored to and moves with (e.g. a label on a cell).
    #[serde(default)]
    pub attached_host: Option<ObjectId>,
    pub shape: Shape,
}

impl DiagramObject {
    pub fn new(shape: Shape) -> Self {
        Self {
            id: Uuid::new_v4(),
            rotation: 0.0,
            style: ShapeStyle::default(),
            attached_host: None,
            shape,
        }
    }

    /// Default-sized object of `kind` at `origin`.
    pub fn placed(kind: ObjectKind, origin: Point) -> Self {
        Self::new(Shape::placed(kind, origin))
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    /// Bounds in the local (unrotated) frame, including the painted stroke.
    pub fn bounds(&self) -> Rect {
        let margin = self.shape.stroke_margin(&self.style);
        self.shape.bounds().inflate(margin, margin)
    }

    /// Rotation pivot.
    pub fn center(&self) -> Point {
        self.shape.bounds().center()
    }

    /// Axis-aligned world-space box of the rotated bounds.
    pub fn world_bounds(&self) -> Rect {
        rotated_rect_bounds(self.bounds(), self.rotation)
    }

    /// Map a world point into the local frame.
    pub fn to_local(&self, point: Point) -> Point {
        rotate_about(point, self.center(), -self.rotation)
    }

    /// Map a local point into world space.
    pub fn to_world(&self, point: Point) -> Point {
        rotate_about(point, self.center(), self.rotation)
    }

    /// Exact geometry hit test of a world point.
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        self.shape
            .hit_test(self.to_local(point), &self.style, tolerance)
    }

    /// Bounding-box hit test of a world point, honouring rotation.
    pub fn hit_bounds(&self, point: Point, tolerance: f64) -> bool {
        rect_contains(
            self.bounds().inflate(tolerance, tolerance),
            self.to_local(point),
        )
    }

    /// World-space attachment point nearest to `near`.
    pub fn attachment_point(&self, near: Point) -> Point {
        let local = self.shape.attachment_point(self.to_local(near));
        self.to_world(local)
    }

    /// Connectors never host other connectors' endpoints.
    pub fn can_host(&self) -> bool {
        !matches!(self.shape, Shape::Connector(_))
    }

    pub fn is_line_like(&self) -> bool {
        self.shape.is_line_like()
    }

    /// Drag-rectangle test: intersects rather than contains.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        match &self.shape {
            Shape::Freehand(f) => f.points.iter().any(|p| rect_contains(rect, self.to_world(*p))),
            shape if shape.is_line_like() => match shape.endpoints() {
                Some((a, b)) => {
                    rect_contains(rect, self.to_world(a)) || rect_contains(rect, self.to_world(b))
                }
                None => false,
            },
            _ => rects_overlap(self.world_bounds(), rect),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.shape.translate(delta);
    }

    /// Normalize rotation, style and geometry. Idempotent.
    pub fn finalize(&mut self) {
        // Connector geometry is already in world space
        self.rotation = match self.shape {
            Shape::Connector(_) => 0.0,
            _ => normalize_degrees(self.rotation),
        };
        self.style.normalize();
        self.shape.finalize();
    }

    /// Copy with a fresh id, offset by `offset`; host links are dropped.
    pub fn duplicate(&self, offset: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.attached_host = None;
        if let Shape::Connector(c) = &mut copy.shape {
            c.source.freeze();
            c.target.freeze();
        }
        copy.translate(offset);
        copy
    }

    /// Outline in world space, rotation applied.
    pub fn to_path(&self) -> BezPath {
        let path = self.shape.to_path();
        if self.rotation == 0.0 {
            return path;
        }
        Affine::rotate_about(self.rotation.to_radians(), self.center()) * path
    }

    pub fn as_connector(&self) -> Option<&Connector> {
        match &self.shape {
            Shape::Connector(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_connector_mut(&mut self) -> Option<&mut Connector> {
        match &mut self.shape {
            Shape::Connector(c) => Some(c),
            _ => None,
        }
    }
}

/// Per-axis scale factors mapping `from` onto `to`; a degenerate axis keeps scale 1.
pub(crate) fn scale_factors(from: Rect, to: Rect) -> (f64, f64) {
    let sx = if from.width().abs() < GEOM_EPSILON {
        1.0
    } else {
        to.width() / from.width()
    };
    let sy = if from.height().abs() < GEOM_EPSILON {
        1.0
    } else {
        to.height() / from.height()
    };
    (sx, sy)
}

/// Map a point from the `from` box into the `to` box.
pub(crate) fn map_point(point: Point, from: Rect, to: Rect) -> Point {
    let (sx, sy) = scale_factors(from, to);
    Point::new(
        to.x0 + (point.x - from.x0) * sx,
        to.y0 + (point.y - from.y0) * sy,
    )
}

/// Stretch `end` away from `start` until the segment is at least `MIN_EXTENT` long.
pub(crate) fn enforce_min_length(start: Point, end: &mut Point) {
    let delta = *end - start;
    let len = delta.hypot();
    // Slack keeps a second pass from re-stretching by rounding error
    if !(len >= MIN_EXTENT - 1e-6) {
        *end = if len.is_finite() && len > GEOM_EPSILON {
            start + delta * (MIN_EXTENT / len)
        } else {
            start + Vec2::new(MIN_EXTENT, 0.0)
        };
    }
}

/// Hit rule shared by closed shapes.
///
/// Solid or filled shapes are hit anywhere inside; stroke-only shapes only on the
/// stroke band just inside the outline. Both accept points within `tolerance`
/// outside the outline.
pub(crate) fn closed_hit(
    inside: bool,
    outline_dist: f64,
    style: &ShapeStyle,
    tolerance: f64,
    solid: bool,
) -> bool {
    if inside {
        solid || style.is_filled() || outline_dist <= style.half_stroke() + tolerance
    } else {
        outline_dist <= tolerance
    }
}

pub(crate) fn box_hit(
    rect: Rect,
    point: Point,
    style: &ShapeStyle,
    tolerance: f64,
    solid: bool,
) -> bool {
    let inside = rect_contains(rect, point);
    let outline = polygon_outline_dist(point, &rect_corners(rect));
    closed_hit(inside, outline, style, tolerance, solid)
}

/// Attachment rule for box-shaped variants: elongated boxes attach at the pole
/// (midpoint of a short side) nearest to `near`, others at the nearest outline point.
pub(crate) fn box_attachment(rect: Rect, near: Point) -> Point {
    let (w, h) = (rect.width(), rect.height());
    let short = w.min(h);
    if short > GEOM_EPSILON && w.max(h) / short >= ELONGATED_ASPECT {
        let center = rect.center();
        let poles = if w >= h {
            [Point::new(rect.x0, center.y), Point::new(rect.x1, center.y)]
        } else {
            [Point::new(center.x, rect.y0), Point::new(center.x, rect.y1)]
        };
        return if distance(near, poles[0]) <= distance(near, poles[1]) {
            poles[0]
        } else {
            poles[1]
        };
    }
    nearest_on_polygon_outline(near, &rect_corners(rect)).unwrap_or(rect.center())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placed_defaults() {
        let circle = DiagramObject::placed(ObjectKind::Circle, Point::new(100.0, 100.0));
        let bounds = circle.bounds();
        assert!((bounds.width() - 80.0).abs() < f64::EPSILON);
        assert_eq!(circle.kind(), ObjectKind::Circle);
        assert!(circle.can_host());

        let connector = DiagramObject::placed(ObjectKind::Connector, Point::ZERO);
        assert!(!connector.can_host());
        assert!(connector.is_line_like());
    }

    #[test]
    fn test_line_bounds_include_half_stroke() {
        let line = DiagramObject::placed(ObjectKind::Line, Point::ZERO);
        let bounds = line.bounds();
        assert!((bounds.y0 + 1.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotated_loose_hit() {
        // 200x20 bar rotated a quarter turn stands upright around (100, 10)
        let bar = DiagramObject::new(Shape::Rectangle(Rectangle::new(Point::ZERO, 200.0, 20.0)))
            .with_rotation(90.0);
        assert!(bar.hit_bounds(Point::new(100.0, 90.0), 0.0));
        assert!(!bar.hit_bounds(Point::new(180.0, 10.0), 0.0));
        let world = bar.world_bounds();
        assert!((world.width() - 20.0).abs() < 1e-9);
        assert!((world.height() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersects_rect_modes() {
        let line = DiagramObject::new(Shape::Line(Line::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        )));
        // Crossing the middle without containing an endpoint does not select a line
        assert!(!line.intersects_rect(Rect::new(40.0, -10.0, 60.0, 10.0)));
        assert!(line.intersects_rect(Rect::new(90.0, -10.0, 110.0, 10.0)));

        let rect = DiagramObject::placed(ObjectKind::Rectangle, Point::ZERO);
        assert!(rect.intersects_rect(Rect::new(100.0, 70.0, 300.0, 300.0)));
        assert!(!rect.intersects_rect(Rect::new(200.0, 200.0, 300.0, 300.0)));

        let freehand = DiagramObject::new(Shape::Freehand(Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(100.0, 0.0),
        ])));
        assert!(freehand.intersects_rect(Rect::new(40.0, 40.0, 60.0, 60.0)));
    }

    #[test]
    fn test_duplicate_gets_fresh_identity() {
        let mut original = DiagramObject::placed(ObjectKind::Rectangle, Point::ZERO);
        original.attached_host = Some(Uuid::new_v4());
        let copy = original.duplicate(Vec2::new(10.0, 10.0));
        assert_ne!(copy.id(), original.id());
        assert!(copy.attached_host.is_none());
        assert!((copy.bounds().x0 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_finalize_normalizes_rotation() {
        let mut obj = DiagramObject::placed(ObjectKind::Polygon, Point::ZERO).with_rotation(-30.0);
        obj.finalize();
        assert!((obj.rotation - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_clears_connector_rotation() {
        let mut connector = DiagramObject::new(Shape::Connector(Connector::new(
            AttachmentPoint::Literal(Point::new(0.0, 0.0)),
            AttachmentPoint::Literal(Point::new(200.0, 0.0)),
            crate::routing::RouteStyle::Straight,
        )))
        .with_rotation(90.0);
        connector.finalize();
        assert_eq!(connector.rotation, 0.0);
        assert!(connector.contains_point(Point::new(150.0, 0.0), 4.0));
        assert!(!connector.contains_point(Point::new(100.0, 50.0), 4.0));

        let ends = crate::handles::handles(&connector);
        assert_eq!(ends[0].position, Point::new(0.0, 0.0));
        assert_eq!(ends[1].position, Point::new(200.0, 0.0));
    }

    #[test]
    fn test_serde_defaults_for_optional_fields() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","shape":{"Circle":{"center":{"x":0.0,"y":0.0},"radius":5.0}}}"#;
        let obj: DiagramObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.rotation, 0.0);
        assert!(obj.attached_host.is_none());
        assert_eq!(obj.style, ShapeStyle::default());
    }

    #[test]
    fn test_pole_attachment_vertical() {
        let p = box_attachment(Rect::new(0.0, 0.0, 20.0, 100.0), Point::new(10.0, 90.0));
        assert_eq!(p, Point::new(10.0, 100.0));
    }
}
