//! The document: ordered diagram objects in paint order.

use crate::shapes::{DiagramObject, ObjectId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// All placed objects, back to front (later = on top).
///
/// Every mutating accessor bumps `revision`, which lets caches such as the
/// overlap cycle detect that the scene changed under them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    objects: Vec<DiagramObject>,
    #[serde(skip)]
    revision: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: Vec<DiagramObject>) -> Self {
        Self {
            objects,
            revision: 0,
        }
    }

    /// Objects in paint order (back to front).
    pub fn objects(&self) -> &[DiagramObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Append an object on top and return its id.
    pub fn add(&mut self, object: DiagramObject) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        self.touch();
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&DiagramObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DiagramObject> {
        let index = self.index_of(id)?;
        self.touch();
        self.objects.get_mut(index)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().map(DiagramObject::id)
    }

    /// Mutable iteration over every object.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DiagramObject> {
        self.touch();
        self.objects.iter_mut()
    }

    /// Remove an object without touching references to it.
    ///
    /// Use `EditorContext::remove_objects` to keep the selection and connector
    /// endpoints consistent.
    pub fn remove(&mut self, id: ObjectId) -> Option<DiagramObject> {
        let index = self.index_of(id)?;
        self.touch();
        Some(self.objects.remove(index))
    }

    /// Replace the whole object sequence (undo/redo and snapshot import).
    pub fn replace_all(&mut self, objects: Vec<DiagramObject>) {
        self.objects = objects;
        self.touch();
    }

    /// Bring an object to the front (topmost). Returns false if it already was.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.objects.len() => {
                let object = self.objects.remove(pos);
                self.objects.push(object);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Send an object to the back (bottommost). Returns false if it already was.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                let object = self.objects.remove(pos);
                self.objects.insert(0, object);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Move an object one layer forward (towards front).
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.objects.len() => {
                self.objects.swap(pos, pos + 1);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Move an object one layer backward (towards back).
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                self.objects.swap(pos, pos - 1);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// World-space box around every object.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(DiagramObject::world_bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Re-resolve every hosted connector endpoint from its host's current geometry.
    ///
    /// Endpoints whose host is gone, or cannot host, are frozen in place.
    pub fn refresh_attachments(&mut self) {
        let mut changed = false;
        for i in 0..self.objects.len() {
            let Some(connector) = self.objects[i].as_connector() else {
                continue;
            };
            if !connector.source.is_hosted() && !connector.target.is_hosted() {
                continue;
            }
            let mut source = connector.source.clone();
            let mut target = connector.target.clone();
            for end in [&mut source, &mut target] {
                let Some(host_id) = end.host() else {
                    continue;
                };
                match self.get(host_id) {
                    Some(host) if host.can_host() => end.resolve(host),
                    _ => {
                        log::warn!("Freezing endpoint anchored to missing host {host_id}");
                        end.freeze();
                    }
                }
            }
            if let Some(connector) = self.objects[i].as_connector_mut() {
                connector.source = source;
                connector.target = target;
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
    }

    /// Clear `attached_host` links that point at objects no longer present.
    pub fn release_dangling_hosts(&mut self) {
        let ids: Vec<ObjectId> = self.ids().collect();
        let mut changed = false;
        for object in &mut self.objects {
            if object.attached_host.is_some_and(|host| !ids.contains(&host)) {
                object.attached_host = None;
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{
        AttachmentPoint, Circle, Connector, EndpointRole, ObjectKind, Shape,
    };
    use crate::routing::RouteStyle;
    use kurbo::{Point, Vec2};

    fn rect_at(x: f64) -> DiagramObject {
        DiagramObject::placed(ObjectKind::Rectangle, Point::new(x, 0.0))
    }

    #[test]
    fn test_add_and_order() {
        let mut doc = Document::new();
        let a = doc.add(rect_at(0.0));
        let b = doc.add(rect_at(10.0));
        assert_eq!(doc.ids().collect::<Vec<_>>(), vec![a, b]);
        assert!(doc.contains(a));
        assert_eq!(doc.index_of(b), Some(1));
    }

    #[test]
    fn test_z_order_commands() {
        let mut doc = Document::new();
        let a = doc.add(rect_at(0.0));
        let b = doc.add(rect_at(10.0));
        let c = doc.add(rect_at(20.0));

        assert!(doc.bring_to_front(a));
        assert_eq!(doc.ids().collect::<Vec<_>>(), vec![b, c, a]);
        assert!(!doc.bring_to_front(a));

        assert!(doc.send_to_back(a));
        assert_eq!(doc.ids().collect::<Vec<_>>(), vec![a, b, c]);

        assert!(doc.bring_forward(a));
        assert_eq!(doc.ids().collect::<Vec<_>>(), vec![b, a, c]);
        assert!(doc.send_backward(c));
        assert_eq!(doc.ids().collect::<Vec<_>>(), vec![b, c, a]);
    }

    #[test]
    fn test_revision_bumps_on_mutation() {
        let mut doc = Document::new();
        let r0 = doc.revision();
        let id = doc.add(rect_at(0.0));
        assert!(doc.revision() > r0);
        let r1 = doc.revision();
        let _ = doc.get(id);
        assert_eq!(doc.revision(), r1);
        let _ = doc.get_mut(id);
        assert!(doc.revision() > r1);
    }

    #[test]
    fn test_refresh_moves_and_freezes_endpoints() {
        let mut doc = Document::new();
        let host = DiagramObject::new(Shape::Circle(Circle::new(Point::new(100.0, 100.0), 40.0)));
        let source = AttachmentPoint::on_host(&host, EndpointRole::Source, Point::new(140.0, 100.0));
        let host_id = doc.add(host);
        let connector = Connector::new(
            source,
            AttachmentPoint::Literal(Point::new(300.0, 100.0)),
            RouteStyle::Straight,
        );
        let conn_id = doc.add(DiagramObject::new(Shape::Connector(connector)));

        if let Some(host) = doc.get_mut(host_id) {
            host.translate(Vec2::new(0.0, 50.0));
        }
        doc.refresh_attachments();
        let c = doc.get(conn_id).and_then(DiagramObject::as_connector).unwrap();
        assert!((c.source.position().y - 150.0).abs() < 1e-9);
        assert!(c.source.is_hosted());

        doc.remove(host_id);
        doc.refresh_attachments();
        let c = doc.get(conn_id).and_then(DiagramObject::as_connector).unwrap();
        assert_eq!(c.source, AttachmentPoint::Literal(Point::new(140.0, 150.0)));
    }

    #[test]
    fn test_release_dangling_hosts() {
        let mut doc = Document::new();
        let host = doc.add(rect_at(0.0));
        let mut label = DiagramObject::placed(ObjectKind::TextBox, Point::new(10.0, 10.0));
        label.attached_host = Some(host);
        let label_id = doc.add(label);
        doc.remove(host);
        doc.release_dangling_hosts();
        assert!(doc.get(label_id).unwrap().attached_host.is_none());
    }

    #[test]
    fn test_bounds_union() {
        let mut doc = Document::new();
        assert!(doc.bounds().is_none());
        doc.add(rect_at(0.0));
        doc.add(rect_at(100.0));
        let bounds = doc.bounds().unwrap();
        assert!((bounds.x1 - 220.0).abs() < f64::EPSILON);
    }
}
