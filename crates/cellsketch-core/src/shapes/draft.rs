//! In-progress object being drawn.

use super::{CurvedPath, DiagramObject, ObjectKind, Shape, ShapeStyle};
use crate::geometry::GEOM_EPSILON;
use kurbo::{Point, Rect, Vec2};
use std::f64::consts::FRAC_PI_4;

/// An object under construction plus the point where drawing started.
///
/// The draft starts with the variant's default dimensions, so a click without a
/// drag still places a usable object. [`Draft::update`] reshapes it from the
/// origin to the pointer; freehand drafts accumulate samples instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    origin: Point,
    object: DiagramObject,
}

impl Draft {
    pub fn new(kind: ObjectKind, origin: Point, style: ShapeStyle) -> Self {
        Self {
            origin,
            object: DiagramObject::placed(kind, origin).with_style(style),
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn object(&self) -> &DiagramObject {
        &self.object
    }

    pub fn kind(&self) -> ObjectKind {
        self.object.kind()
    }

    /// Reshape the in-progress object for the pointer at `current`.
    ///
    /// `constrain` squares box shapes (or keeps an image's source aspect) and
    /// snaps line directions to multiples of 45°.
    pub fn update(&mut self, current: Point, constrain: bool) {
        let origin = self.origin;
        match &mut self.object.shape {
            Shape::Circle(c) => {
                c.center = origin;
                c.radius = (current - origin).hypot();
            }
            Shape::Polygon(p) => {
                let r = (current - origin).hypot();
                p.center = origin;
                p.radius_x = r;
                p.radius_y = r;
            }
            Shape::Rectangle(r) => r.set_rect(drag_rect(origin, current, constrain.then_some(1.0))),
            Shape::TextBox(t) => t.set_rect(drag_rect(origin, current, constrain.then_some(1.0))),
            Shape::Container(c) => c.set_rect(drag_rect(origin, current, constrain.then_some(1.0))),
            Shape::Image(i) => {
                let aspect = if constrain {
                    Some(i.source_aspect().unwrap_or(1.0))
                } else {
                    None
                };
                i.set_rect(drag_rect(origin, current, aspect));
            }
            Shape::Line(l) => {
                l.start = origin;
                l.end = constrained_end(origin, current, constrain);
            }
            Shape::TaperedLine(l) => {
                l.start = origin;
                l.end = constrained_end(origin, current, constrain);
            }
            Shape::CurvedPath(c) => {
                *c = CurvedPath::through(origin, constrained_end(origin, current, constrain));
            }
            Shape::Freehand(f) => f.add_point(current),
            Shape::Connector(c) => {
                c.target = super::AttachmentPoint::Literal(current);
            }
        }
    }

    /// Apply variant normalization and hand the object over.
    pub fn finalize(mut self) -> DiagramObject {
        self.object.finalize();
        self.object
    }
}

/// Box spanned by a drag; `aspect` (height / width) forces proportional sides.
fn drag_rect(origin: Point, current: Point, aspect: Option<f64>) -> Rect {
    let Some(aspect) = aspect else {
        return Rect::from_points(origin, current);
    };
    let delta = current - origin;
    let width = delta.x.abs().max(delta.y.abs() / aspect);
    let height = width * aspect;
    let corner = origin
        + Vec2::new(
            width.copysign(if delta.x == 0.0 { 1.0 } else { delta.x }),
            height.copysign(if delta.y == 0.0 { 1.0 } else { delta.y }),
        );
    Rect::from_points(origin, corner)
}

/// Snap the direction origin→current to the nearest multiple of 45° when constrained.
fn constrained_end(origin: Point, current: Point, constrain: bool) -> Point {
    let delta = current - origin;
    let len = delta.hypot();
    if !constrain || len < GEOM_EPSILON {
        return current;
    }
    let angle = (delta.y.atan2(delta.x) / FRAC_PI_4).round() * FRAC_PI_4;
    origin + Vec2::new(angle.cos(), angle.sin()) * len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_follows_drag() {
        let mut draft = Draft::new(ObjectKind::Rectangle, Point::new(10.0, 10.0), ShapeStyle::default());
        draft.update(Point::new(110.0, 60.0), false);
        let obj = draft.finalize();
        let bounds = obj.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_up_left_normalizes() {
        let mut draft = Draft::new(ObjectKind::Container, Point::new(100.0, 100.0), ShapeStyle::default());
        draft.update(Point::new(40.0, 20.0), false);
        let bounds = draft.finalize().bounds();
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constrained_rect_is_square() {
        let mut draft = Draft::new(ObjectKind::Rectangle, Point::ZERO, ShapeStyle::default());
        draft.update(Point::new(-30.0, 80.0), true);
        let bounds = draft.object().bounds();
        assert!((bounds.width() - 80.0).abs() < 1e-9);
        assert!((bounds.height() - 80.0).abs() < 1e-9);
        assert!((bounds.x0 + 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_constrained_line_snaps_to_45() {
        let mut draft = Draft::new(ObjectKind::Line, Point::ZERO, ShapeStyle::default());
        draft.update(Point::new(100.0, 10.0), true);
        match &draft.object().shape {
            Shape::Line(l) => assert!(l.end.y.abs() < 1e-9),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_click_keeps_default_size() {
        let draft = Draft::new(ObjectKind::Circle, Point::new(5.0, 5.0), ShapeStyle::default());
        let obj = draft.finalize();
        assert!((obj.bounds().width() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_freehand_accumulates() {
        let mut draft = Draft::new(ObjectKind::Freehand, Point::ZERO, ShapeStyle::default());
        draft.update(Point::new(5.0, 0.0), false);
        draft.update(Point::new(10.0, 5.0), false);
        match &draft.object().shape {
            Shape::Freehand(f) => assert_eq!(f.len(), 3),
            other => panic!("unexpected shape {other:?}"),
        }
    }
}
