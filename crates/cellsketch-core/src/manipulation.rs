//! Per-variant resize and rotation rules applied while a handle is dragged.
//!
//! Every rule is computed from the object as it was when the drag started plus
//! the total pointer travel since then, so repeated pointer-move events never
//! accumulate rounding error.

use crate::geometry::{angle_degrees, normalize_degrees, rotate_about};
use crate::handles::{Corner, Edge, HandleKind, corner_point, edge_point};
use crate::shapes::{AttachmentPoint, DiagramObject, MIN_EXTENT, Shape};
use kurbo::{Point, Rect, Vec2};

/// Result of resizing `original` by dragging `handle` by `delta` (world units).
///
/// Returns `None` when the object has no such handle, which callers treat as a
/// stale handle and ignore.
pub fn apply_resize(
    original: &DiagramObject,
    handle: HandleKind,
    delta: Vec2,
    keep_aspect: bool,
) -> Option<DiagramObject> {
    let mut object = original.clone();
    match handle {
        HandleKind::Corner(_) | HandleKind::Edge(_) => {
            if original.is_line_like() && !matches!(original.shape, Shape::Freehand(_)) {
                return None;
            }
            resize_box(&mut object, original, handle, delta, keep_aspect)?;
        }
        HandleKind::Start | HandleKind::End => {
            bake_rotation(&mut object);
            move_endpoint(&mut object.shape, handle, delta)?;
        }
        HandleKind::Control => {
            bake_rotation(&mut object);
            match &mut object.shape {
                Shape::CurvedPath(c) => c.control += delta,
                _ => return None,
            }
        }
        HandleKind::Rotate => return None,
    }
    object.finalize();
    Some(object)
}

/// Box-shaped resize: the side or corner opposite the handle stays fixed in world space.
fn resize_box(
    object: &mut DiagramObject,
    original: &DiagramObject,
    handle: HandleKind,
    delta: Vec2,
    keep_aspect: bool,
) -> Option<()> {
    let bounds = original.shape.bounds();
    // Pointer travel expressed in the object's local frame
    let local = rotate_about(delta.to_point(), Point::ZERO, -original.rotation).to_vec2();

    let (mut x0, mut y0, mut x1, mut y1) = (bounds.x0, bounds.y0, bounds.x1, bounds.y1);
    match handle {
        HandleKind::Corner(Corner::Nw) => {
            x0 += local.x;
            y0 += local.y;
        }
        HandleKind::Corner(Corner::Ne) => {
            x1 += local.x;
            y0 += local.y;
        }
        HandleKind::Corner(Corner::Sw) => {
            x0 += local.x;
            y1 += local.y;
        }
        HandleKind::Corner(Corner::Se) => {
            x1 += local.x;
            y1 += local.y;
        }
        HandleKind::Edge(Edge::N) => y0 += local.y,
        HandleKind::Edge(Edge::S) => y1 += local.y,
        HandleKind::Edge(Edge::E) => x1 += local.x,
        HandleKind::Edge(Edge::W) => x0 += local.x,
        _ => return None,
    }
    // The handle's opposite point in any box
    let fixed = |r: Rect| match handle {
        HandleKind::Corner(c) => corner_point(r, opposite_corner(c)),
        HandleKind::Edge(e) => edge_point(r, opposite_edge(e)),
        _ => r.center(),
    };
    let anchor = fixed(bounds);

    let circle = matches!(original.shape, Shape::Circle(_));
    let image_locked = match &original.shape {
        Shape::Image(img) => img.lock_aspect && img.source_aspect().is_some(),
        _ => false,
    };
    let proportional =
        matches!(handle, HandleKind::Corner(_)) && (keep_aspect || circle || image_locked);

    let mut target = Rect::new(x0, y0, x1, y1).abs();
    if proportional {
        target = proportional_rect(bounds, target, anchor);
    }
    target = enforce_min_size(target, anchor);

    object.shape.scale_to_bounds(bounds, target);

    // Scaling moves the rotation pivot, so re-pin the fixed point in world space
    let fixed_before = original.to_world(anchor);
    let fixed_after = object.to_world(fixed(object.shape.bounds()));
    object.translate(fixed_before - fixed_after);
    Some(())
}

/// Grow `target` to the original aspect ratio, keeping the corner nearest `anchor`.
fn proportional_rect(original: Rect, target: Rect, anchor: Point) -> Rect {
    if original.width() <= 0.0 || original.height() <= 0.0 {
        return target;
    }
    let aspect = original.height() / original.width();
    let width = target.width().max(target.height() / aspect);
    let height = width * aspect;
    pinned_rect(target, anchor, width, height)
}

fn enforce_min_size(target: Rect, anchor: Point) -> Rect {
    if target.width() >= MIN_EXTENT && target.height() >= MIN_EXTENT {
        return target;
    }
    pinned_rect(
        target,
        anchor,
        target.width().max(MIN_EXTENT),
        target.height().max(MIN_EXTENT),
    )
}

/// Rect of the given size sharing with `target` the sides closest to `anchor`.
fn pinned_rect(target: Rect, anchor: Point, width: f64, height: f64) -> Rect {
    let x0 = if (anchor.x - target.x1).abs() < (anchor.x - target.x0).abs() {
        target.x1 - width
    } else {
        target.x0
    };
    let y0 = if (anchor.y - target.y1).abs() < (anchor.y - target.y0).abs() {
        target.y1 - height
    } else {
        target.y0
    };
    Rect::new(x0, y0, x0 + width, y0 + height)
}

fn opposite_corner(corner: Corner) -> Corner {
    match corner {
        Corner::Nw => Corner::Se,
        Corner::Ne => Corner::Sw,
        Corner::Sw => Corner::Ne,
        Corner::Se => Corner::Nw,
    }
}

fn opposite_edge(edge: Edge) -> Edge {
    match edge {
        Edge::N => Edge::S,
        Edge::S => Edge::N,
        Edge::E => Edge::W,
        Edge::W => Edge::E,
    }
}

/// Fold a line-like object's rotation into its points so endpoints can be moved in world space.
fn bake_rotation(object: &mut DiagramObject) {
    if object.rotation == 0.0 {
        return;
    }
    let (center, rotation) = (object.center(), object.rotation);
    let rotate = |p: &mut Point| *p = rotate_about(*p, center, rotation);
    match &mut object.shape {
        Shape::Line(l) => {
            rotate(&mut l.start);
            rotate(&mut l.end);
        }
        Shape::TaperedLine(l) => {
            rotate(&mut l.start);
            rotate(&mut l.end);
        }
        Shape::CurvedPath(c) => {
            rotate(&mut c.start);
            rotate(&mut c.control);
            rotate(&mut c.end);
        }
        Shape::Connector(c) => {
            for end in [&mut c.source, &mut c.target] {
                if let AttachmentPoint::Literal(p) = end {
                    rotate(p);
                }
            }
        }
        _ => return,
    }
    object.rotation = 0.0;
}

/// Relocate one endpoint of a line-like shape; the other stays put.
fn move_endpoint(shape: &mut Shape, handle: HandleKind, delta: Vec2) -> Option<()> {
    let start = handle == HandleKind::Start;
    match shape {
        Shape::Line(l) => *(if start { &mut l.start } else { &mut l.end }) += delta,
        Shape::TaperedLine(l) => *(if start { &mut l.start } else { &mut l.end }) += delta,
        Shape::CurvedPath(c) => *(if start { &mut c.start } else { &mut c.end }) += delta,
        Shape::Connector(c) => {
            let end = if start { &mut c.source } else { &mut c.target };
            // A dragged endpoint is loose until dropped on a host
            *end = AttachmentPoint::Literal(end.position() + delta);
        }
        _ => return None,
    }
    Some(())
}

/// Rotation (degrees) after dragging the rotate handle from `start` to `current`.
///
/// Relative to the angle at drag start; `snap_step` rounds to discrete angles.
pub fn rotation_for_drag(
    original: &DiagramObject,
    start: Point,
    current: Point,
    snap_step: Option<f64>,
) -> f64 {
    let center = original.center();
    let mut rotation = original.rotation + angle_degrees(center, current) - angle_degrees(center, start);
    if let Some(step) = snap_step.filter(|s| *s > 0.0) {
        rotation = (rotation / step).round() * step;
    }
    normalize_degrees(rotation)
}
