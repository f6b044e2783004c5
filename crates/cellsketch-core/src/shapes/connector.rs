//! Directed connector between two attachment points.

use super::{DiagramObject, ObjectId, ShapeStyle, ShapeTrait, map_point};
use crate::geometry::{GEOM_EPSILON, rotate_about};
use crate::routing::{ConnectorPath, DEFAULT_CURVATURE, RouteStyle, route};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Which end of a connector an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    Source,
    Target,
}

/// A connector endpoint: either a fixed coordinate or a live reference to a host.
///
/// For hosted endpoints `anchor` is the endpoint's normalised position inside the
/// host's unrotated bounds and `position` the last resolved world coordinate.
/// The coordinate is always derived from the reference, never the reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentPoint {
    Literal(Point),
    Hosted {
        host: ObjectId,
        role: EndpointRole,
        anchor: Vec2,
        position: Point,
    },
}

impl AttachmentPoint {
    /// Anchor an endpoint on `host` at the host-specific point nearest to `near`.
    pub fn on_host(host: &DiagramObject, role: EndpointRole, near: Point) -> Self {
        let position = host.attachment_point(near);
        let local = host.to_local(position);
        let bounds = host.shape.bounds();
        let anchor = Vec2::new(
            normalized(local.x, bounds.x0, bounds.width()),
            normalized(local.y, bounds.y0, bounds.height()),
        );
        AttachmentPoint::Hosted {
            host: host.id(),
            role,
            anchor,
            position,
        }
    }

    /// Current world coordinate of the endpoint.
    pub fn position(&self) -> Point {
        match self {
            AttachmentPoint::Literal(p) => *p,
            AttachmentPoint::Hosted { position, .. } => *position,
        }
    }

    pub fn host(&self) -> Option<ObjectId> {
        match self {
            AttachmentPoint::Literal(_) => None,
            AttachmentPoint::Hosted { host, .. } => Some(*host),
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, AttachmentPoint::Hosted { .. })
    }

    /// Recompute the coordinate from the host's current geometry.
    pub fn resolve(&mut self, host: &DiagramObject) {
        if let AttachmentPoint::Hosted {
            anchor, position, ..
        } = self
        {
            let bounds = host.shape.bounds();
            let local = Point::new(
                bounds.x0 + anchor.x * bounds.width(),
                bounds.y0 + anchor.y * bounds.height(),
            );
            let world = rotate_about(local, host.center(), host.rotation);
            *position = host.attachment_point(world);
        }
    }

    /// Degrade to a literal at the last resolved coordinate.
    pub fn freeze(&mut self) {
        *self = AttachmentPoint::Literal(self.position());
    }
}

fn normalized(value: f64, min: f64, extent: f64) -> f64 {
    if extent.abs() < GEOM_EPSILON {
        0.5
    } else {
        (value - min) / extent
    }
}

/// Decoration drawn at the target end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorHead {
    None,
    /// Activation arrow.
    #[default]
    Arrow,
    /// Inhibition bar.
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub source: AttachmentPoint,
    pub target: AttachmentPoint,
    #[serde(default)]
    pub route: RouteStyle,
    #[serde(default = "default_curvature")]
    pub curvature: f64,
    /// Fraction of the path where a renderer draws the travelling signal marker.
    #[serde(default)]
    pub signal_position: f64,
    #[serde(default)]
    pub head: ConnectorHead,
}

fn default_curvature() -> f64 {
    DEFAULT_CURVATURE
}

impl Connector {
    pub const DEFAULT_LENGTH: f64 = 100.0;
    pub const MAX_CURVATURE: f64 = 2.0;

    pub fn new(source: AttachmentPoint, target: AttachmentPoint, route: RouteStyle) -> Self {
        Self {
            source,
            target,
            route,
            curvature: DEFAULT_CURVATURE,
            signal_position: 0.0,
            head: ConnectorHead::default(),
        }
    }

    /// Unattached connector starting at the placement origin.
    pub fn placed(origin: Point) -> Self {
        Self::new(
            AttachmentPoint::Literal(origin),
            AttachmentPoint::Literal(origin + Vec2::new(Self::DEFAULT_LENGTH, 0.0)),
            RouteStyle::Straight,
        )
    }

    pub fn path(&self) -> ConnectorPath {
        route(
            self.source.position(),
            self.target.position(),
            self.route,
            self.curvature,
        )
    }

    /// Position of the signal marker along the path.
    pub fn signal_point(&self) -> Point {
        self.path().point_at(self.signal_position)
    }

    pub fn endpoint(&self, role: EndpointRole) -> &AttachmentPoint {
        match role {
            EndpointRole::Source => &self.source,
            EndpointRole::Target => &self.target,
        }
    }

    pub fn endpoint_mut(&mut self, role: EndpointRole) -> &mut AttachmentPoint {
        match role {
            EndpointRole::Source => &mut self.source,
            EndpointRole::Target => &mut self.target,
        }
    }

    /// Ids of the hosts either endpoint references.
    pub fn hosts(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.source.host().into_iter().chain(self.target.host())
    }

    pub fn references(&self, id: ObjectId) -> bool {
        self.hosts().any(|h| h == id)
    }
}

impl ShapeTrait for Connector {
    fn bounds(&self) -> Rect {
        self.path().bounds()
    }

    fn stroke_margin(&self, style: &ShapeStyle) -> f64 {
        style.half_stroke()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        self.path().distance_to(point) <= style.half_stroke() + tolerance
    }

    fn attachment_point(&self, near: Point) -> Point {
        self.path().nearest_point(near)
    }

    fn to_path(&self) -> BezPath {
        self.path().to_bez_path()
    }

    /// Only literal endpoints move; hosted ones follow their hosts.
    fn translate(&mut self, delta: Vec2) {
        for end in [&mut self.source, &mut self.target] {
            if let AttachmentPoint::Literal(p) = end {
                *p += delta;
            }
        }
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        for end in [&mut self.source, &mut self.target] {
            if let AttachmentPoint::Literal(p) = end {
                *p = map_point(*p, from, to);
            }
        }
    }

    fn finalize(&mut self) {
        self.signal_position = if self.signal_position.is_finite() {
            self.signal_position.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.curvature = if self.curvature.is_finite() {
            self.curvature.clamp(-Self::MAX_CURVATURE, Self::MAX_CURVATURE)
        } else {
            DEFAULT_CURVATURE
        };
    }

    fn is_line_like(&self) -> bool {
        true
    }

    fn endpoints(&self) -> Option<(Point, Point)> {
        Some((self.source.position(), self.target.position()))
    }
}
