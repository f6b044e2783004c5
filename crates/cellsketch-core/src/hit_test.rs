//! Point and rectangle picking over the document, plus overlap cycling.

use crate::document::Document;
use crate::shapes::{DiagramObject, ObjectId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// How a pointer position is matched against objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitMode {
    /// Point in the (rotated) bounding box.
    #[default]
    Loose,
    /// Per-variant geometry: stroke distance for paths, containment for closed shapes.
    Exact,
}

fn hits(object: &DiagramObject, point: Point, mode: HitMode, tolerance: f64) -> bool {
    match mode {
        HitMode::Loose => object.hit_bounds(point, tolerance),
        HitMode::Exact => object.contains_point(point, tolerance),
    }
}

/// Ids of every object under `point`, topmost first.
///
/// `tolerance` is in world units (screen tolerance divided by zoom).
pub fn objects_at_point(
    document: &Document,
    point: Point,
    mode: HitMode,
    tolerance: f64,
) -> Vec<ObjectId> {
    document
        .objects()
        .iter()
        .rev()
        .filter(|o| hits(o, point, mode, tolerance))
        .map(DiagramObject::id)
        .collect()
}

/// The topmost object under `point`.
pub fn topmost_at_point(
    document: &Document,
    point: Point,
    mode: HitMode,
    tolerance: f64,
) -> Option<ObjectId> {
    document
        .objects()
        .iter()
        .rev()
        .find(|o| hits(o, point, mode, tolerance))
        .map(DiagramObject::id)
}

/// Ids of objects touched by a drag rectangle, in paint order.
pub fn objects_in_rect(document: &Document, rect: Rect) -> Vec<ObjectId> {
    let rect = rect.abs();
    document
        .objects()
        .iter()
        .filter(|o| o.intersects_rect(rect))
        .map(DiagramObject::id)
        .collect()
}

/// Stack of objects under one click, stepped through by `cycle_overlap`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapCycle {
    pub point: Point,
    /// Hits at `point`, topmost first.
    pub hits: Vec<ObjectId>,
    pub index: usize,
    /// Document revision the hits were computed against.
    pub revision: u64,
}

impl OverlapCycle {
    /// Record the hits of a click. Returns `None` unless at least two objects overlap.
    pub fn record(point: Point, hits: Vec<ObjectId>, selected: ObjectId, revision: u64) -> Option<Self> {
        if hits.len() < 2 {
            return None;
        }
        let index = hits.iter().position(|&id| id == selected).unwrap_or(0);
        Some(Self {
            point,
            hits,
            index,
            revision,
        })
    }

    /// Still describes `document`: same revision and every hit still present.
    pub fn is_valid(&self, document: &Document) -> bool {
        self.revision == document.revision() && self.hits.iter().all(|&id| document.contains(id))
    }

    /// Step to the next object in the stack and return it.
    pub fn advance(&mut self) -> Option<ObjectId> {
        if self.hits.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.hits.len();
        self.hits.get(self.index).copied()
    }

    pub fn current(&self) -> Option<ObjectId> {
        self.hits.get(self.index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, ObjectKind, Rectangle, Shape, ShapeStyle};

    fn doc_with_stack() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::new();
        let bottom = doc.add(DiagramObject::placed(ObjectKind::Rectangle, Point::ZERO));
        let top = doc.add(DiagramObject::placed(ObjectKind::Rectangle, Point::new(50.0, 40.0)));
        (doc, bottom, top)
    }

    #[test]
    fn test_topmost_first() {
        let (doc, bottom, top) = doc_with_stack();
        let ids = objects_at_point(&doc, Point::new(60.0, 50.0), HitMode::Loose, 0.0);
        assert_eq!(ids, vec![top, bottom]);
        assert_eq!(
            topmost_at_point(&doc, Point::new(60.0, 50.0), HitMode::Loose, 0.0),
            Some(top)
        );
        assert_eq!(
            topmost_at_point(&doc, Point::new(10.0, 10.0), HitMode::Loose, 0.0),
            Some(bottom)
        );
        assert!(objects_at_point(&doc, Point::new(500.0, 500.0), HitMode::Loose, 0.0).is_empty());
    }

    #[test]
    fn test_exact_mode_ignores_hollow_interior() {
        let mut doc = Document::new();
        let id = doc.add(DiagramObject::new(Shape::Rectangle(Rectangle::new(
            Point::ZERO,
            100.0,
            100.0,
        ))));
        let center = Point::new(50.0, 50.0);
        assert_eq!(topmost_at_point(&doc, center, HitMode::Loose, 0.0), Some(id));
        assert_eq!(topmost_at_point(&doc, center, HitMode::Exact, 2.0), None);
        assert_eq!(
            topmost_at_point(&doc, Point::new(1.0, 50.0), HitMode::Exact, 2.0),
            Some(id)
        );

        let filled = ShapeStyle {
            fill_color: Some(crate::shapes::SerializableColor::white()),
            ..ShapeStyle::default()
        };
        if let Some(obj) = doc.get_mut(id) {
            obj.style = filled;
        }
        assert_eq!(topmost_at_point(&doc, center, HitMode::Exact, 2.0), Some(id));
    }

    #[test]
    fn test_loose_mode_honours_rotation() {
        let mut doc = Document::new();
        let id = doc.add(
            DiagramObject::new(Shape::Rectangle(Rectangle::new(Point::ZERO, 200.0, 20.0)))
                .with_rotation(90.0),
        );
        // Rotated a quarter turn about (100, 10) the bar spans y in [-90, 110]
        assert_eq!(
            topmost_at_point(&doc, Point::new(100.0, 100.0), HitMode::Loose, 0.0),
            Some(id)
        );
        assert_eq!(topmost_at_point(&doc, Point::new(180.0, 10.0), HitMode::Loose, 0.0), None);
    }

    #[test]
    fn test_rect_selection_intersects() {
        let mut doc = Document::new();
        let rect = doc.add(DiagramObject::placed(ObjectKind::Rectangle, Point::ZERO));
        let line = doc.add(DiagramObject::new(Shape::Line(Line::new(
            Point::new(300.0, 0.0),
            Point::new(400.0, 0.0),
        ))));
        // Overlaps the rectangle's corner and the line's middle but neither endpoint
        let ids = objects_in_rect(&doc, Rect::new(100.0, -10.0, 350.0, 10.0));
        assert_eq!(ids, vec![rect]);
        let ids = objects_in_rect(&doc, Rect::new(390.0, -10.0, 410.0, 10.0));
        assert_eq!(ids, vec![line]);
    }

    #[test]
    fn test_cycle_wraps_and_invalidates() {
        let (mut doc, bottom, top) = doc_with_stack();
        let hits = objects_at_point(&doc, Point::new(60.0, 50.0), HitMode::Loose, 0.0);
        assert!(OverlapCycle::record(Point::ZERO, vec![top], top, doc.revision()).is_none());

        let mut cycle = OverlapCycle::record(Point::new(60.0, 50.0), hits, top, doc.revision()).unwrap();
        assert_eq!(cycle.current(), Some(top));
        assert_eq!(cycle.advance(), Some(bottom));
        assert_eq!(cycle.advance(), Some(top));
        assert!(cycle.is_valid(&doc));

        doc.remove(bottom);
        assert!(!cycle.is_valid(&doc));
    }
}
