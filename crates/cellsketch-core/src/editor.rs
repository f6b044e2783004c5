//! The editor: owns the context and the active tool, and applies transitions.
//!
//! Every pointer event runs to completion here. Tools only report what
//! happened; the editor is the single place that changes the interaction state
//! and pushes history, so each logical action commits exactly once.

use crate::config::EditorConfig;
use crate::document::Document;
use crate::history::History;
use crate::input::{Modifiers, PointerEvent, PointerInput};
use crate::selection::Selection;
use crate::shapes::{AttachmentPoint, DiagramObject, ObjectId, ShapeStyle};
use crate::snapshot::DocumentSnapshot;
use crate::tools::{EditorContext, InteractionState, Preview, Tool, ToolKind, Transition, tool_for};
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Offset applied to duplicated objects, in world units.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

#[derive(Debug)]
pub struct Editor {
    ctx: EditorContext,
    state: InteractionState,
    tool: Box<dyn Tool>,
    preview: Option<Preview>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an empty document. An invalid configuration is
    /// replaced by the defaults.
    pub fn new(config: EditorConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("{err}; using default configuration");
                EditorConfig::default()
            }
        };
        Self {
            ctx: EditorContext::new(config),
            state: InteractionState::Idle,
            tool: tool_for(ToolKind::default()),
            preview: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.ctx.document
    }

    pub fn selection(&self) -> &Selection {
        &self.ctx.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.ctx.viewport
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn tool(&self) -> ToolKind {
        self.tool.kind()
    }

    /// In-progress geometry of the active interaction, if any.
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.ctx.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.ctx.config
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    fn input(&self, screen: Point, modifiers: Modifiers) -> PointerInput {
        PointerInput {
            screen,
            world: self.ctx.viewport.screen_to_world(screen),
            modifiers,
        }
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Enter(state) => {
                if state != self.state {
                    log::debug!("{:?} -> {:?}", self.state, state);
                }
                self.state = state;
            }
            Transition::Commit(label) => {
                self.ctx.commit(label);
                self.finish();
            }
            Transition::Finish => self.finish(),
        }
    }

    fn finish(&mut self) {
        if self.state != InteractionState::Idle {
            log::debug!("{:?} -> Idle", self.state);
        }
        self.state = InteractionState::Idle;
        self.preview = None;
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        let input = self.input(screen, modifiers);
        let transition = self.tool.on_enter(self.state, &input, &mut self.ctx);
        self.apply(transition);
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) {
        let input = self.input(screen, modifiers);
        self.preview = self.tool.on_pointer_move(self.state, &input, &mut self.ctx);
    }

    pub fn pointer_up(&mut self, screen: Point, modifiers: Modifiers) {
        let input = self.input(screen, modifiers);
        let transition = self.tool.on_exit(self.state, &input, &mut self.ctx);
        self.apply(transition);
    }

    /// Dispatch a serialized pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                modifiers,
            } => self.pointer_down(position, modifiers),
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up {
                position,
                modifiers,
            } => self.pointer_up(position, modifiers),
        }
    }

    /// Abandon the current interaction and return to Idle.
    pub fn cancel(&mut self) {
        if self.state != InteractionState::Idle {
            log::debug!("Cancelling {:?}", self.state);
        }
        self.tool.cancel(&mut self.ctx);
        self.finish();
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        self.cancel();
        if kind != self.tool.kind() {
            log::debug!("Tool {} -> {}", self.tool.kind(), kind);
        }
        self.tool = tool_for(kind);
    }

    /// Switch tools by name. Returns false, leaving the tool unchanged, for an unknown name.
    pub fn set_tool_by_name(&mut self, name: &str) -> bool {
        match name.parse::<ToolKind>() {
            Ok(kind) => {
                self.set_tool(kind);
                true
            }
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    fn restore(&mut self, objects: Vec<DiagramObject>) {
        self.ctx.document.replace_all(objects);
        self.ctx.selection.clear();
        self.ctx.cycle = None;
    }

    pub fn undo(&mut self) -> bool {
        self.cancel();
        match self.ctx.history.undo() {
            Some(objects) => {
                self.restore(objects);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.cancel();
        match self.ctx.history.redo() {
            Some(objects) => {
                self.restore(objects);
                true
            }
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> usize {
        self.cancel();
        let ids = self.ctx.selection.ids().to_vec();
        let removed = self.ctx.remove_objects(&ids);
        if removed > 0 {
            self.ctx.commit("delete");
        }
        removed
    }

    /// Copy the selection with fresh ids; the copies become the selection.
    ///
    /// Links between copied objects are carried over to the copies; links to
    /// objects outside the selection are dropped.
    pub fn duplicate_selected(&mut self) -> Vec<ObjectId> {
        self.cancel();
        let originals: Vec<DiagramObject> = self
            .ctx
            .document
            .objects()
            .iter()
            .filter(|o| self.ctx.selection.contains(o.id()))
            .cloned()
            .collect();
        if originals.is_empty() {
            return Vec::new();
        }

        let mut copies: Vec<DiagramObject> = originals
            .iter()
            .map(|o| o.duplicate(DUPLICATE_OFFSET))
            .collect();
        let id_map: HashMap<ObjectId, ObjectId> = originals
            .iter()
            .zip(&copies)
            .map(|(o, c)| (o.id(), c.id()))
            .collect();

        for (original, copy) in originals.iter().zip(copies.iter_mut()) {
            copy.attached_host = original.attached_host.and_then(|h| id_map.get(&h).copied());
            if let (Some(from), Some(to)) = (original.as_connector(), copy.as_connector_mut()) {
                if let Some(source) = remap_endpoint(&from.source, &id_map) {
                    to.source = source;
                }
                if let Some(target) = remap_endpoint(&from.target, &id_map) {
                    to.target = target;
                }
            }
        }

        let ids: Vec<ObjectId> = copies.iter().map(DiagramObject::id).collect();
        for copy in copies {
            self.ctx.document.add(copy);
        }
        self.ctx.selection.select_many(ids.iter().copied());
        self.ctx.commit("duplicate");
        ids
    }

    /// Select the next object in the stack under the last click.
    pub fn cycle_overlap(&mut self) -> Option<ObjectId> {
        self.cancel();
        let valid = self
            .ctx
            .cycle
            .as_ref()
            .is_some_and(|c| c.is_valid(&self.ctx.document));
        if !valid {
            if self.ctx.cycle.take().is_some() {
                log::debug!("Overlap cycle is stale; dropped");
            }
            return None;
        }
        let next = self.ctx.cycle.as_mut().and_then(|c| c.advance())?;
        self.ctx.selection.select(next);
        Some(next)
    }

    pub fn select_all(&mut self) {
        self.cancel();
        let ids: Vec<ObjectId> = self.ctx.document.ids().collect();
        self.ctx.selection.select_many(ids);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.ctx.viewport.pan(delta);
    }

    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        self.ctx.viewport.zoom_at(screen, factor);
    }

    /// Property edit: apply `style` to every selected object.
    pub fn set_style_of_selected(&mut self, style: ShapeStyle) {
        self.cancel();
        if self.ctx.selection.is_empty() {
            return;
        }
        let ids = self.ctx.selection.ids().to_vec();
        let mut changed = false;
        for id in ids {
            if let Some(object) = self.ctx.document.get_mut(id) {
                let before = object.clone();
                object.style = style.clone();
                object.finalize();
                changed |= *object != before;
            }
        }
        if changed {
            self.ctx.commit("style");
        }
    }

    /// Selected ids ordered by their current paint position.
    fn selected_in_paint_order(&self) -> Vec<ObjectId> {
        self.ctx
            .document
            .ids()
            .filter(|&id| self.ctx.selection.contains(id))
            .collect()
    }

    fn reorder(&mut self, label: &'static str, topmost_first: bool, op: fn(&mut Document, ObjectId) -> bool) {
        self.cancel();
        let mut ids = self.selected_in_paint_order();
        if topmost_first {
            ids.reverse();
        }
        let before: Vec<ObjectId> = self.ctx.document.ids().collect();
        for id in ids {
            op(&mut self.ctx.document, id);
        }
        if self.ctx.document.ids().ne(before.iter().copied()) {
            self.ctx.commit(label);
        }
    }

    pub fn bring_to_front_selected(&mut self) {
        self.reorder("bring to front", false, Document::bring_to_front);
    }

    pub fn send_to_back_selected(&mut self) {
        self.reorder("send to back", true, Document::send_to_back);
    }

    pub fn bring_forward_selected(&mut self) {
        self.reorder("bring forward", true, Document::bring_forward);
    }

    pub fn send_backward_selected(&mut self) {
        self.reorder("send backward", false, Document::send_backward);
    }

    /// Move a connector's signal marker. Renderer-driven playback, not an edit.
    pub fn set_signal_position(&mut self, id: ObjectId, t: f64) -> bool {
        match self
            .ctx
            .document
            .get_mut(id)
            .and_then(DiagramObject::as_connector_mut)
        {
            Some(connector) => {
                connector.signal_position = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
                true
            }
            None => false,
        }
    }

    pub fn export_snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(
            self.ctx.document.objects().to_vec(),
            self.ctx.viewport.clone(),
        )
    }

    /// Replace the document and viewport; history restarts from the imported state.
    pub fn import_snapshot(&mut self, snapshot: DocumentSnapshot) {
        self.cancel();
        let (document, viewport) =
            snapshot.into_document(self.ctx.config.min_zoom, self.ctx.config.max_zoom);
        log::info!("Imported snapshot with {} objects", document.len());
        self.ctx.history.reset(document.objects().to_vec());
        self.ctx.document = document;
        self.ctx.viewport = viewport;
        self.ctx.selection.clear();
        self.ctx.cycle = None;
    }
}

/// Point a copied connector endpoint at the copy of its host, if the host was copied too.
fn remap_endpoint(
    endpoint: &AttachmentPoint,
    id_map: &HashMap<ObjectId, ObjectId>,
) -> Option<AttachmentPoint> {
    match endpoint {
        AttachmentPoint::Hosted {
            host,
            role,
            anchor,
            position,
        } => id_map.get(host).map(|&copy| AttachmentPoint::Hosted {
            host: copy,
            role: *role,
            anchor: *anchor,
            position: *position + DUPLICATE_OFFSET,
        }),
        AttachmentPoint::Literal(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ObjectKind, Shape};

    fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        editor.pointer_down(Point::new(from.0, from.1), Modifiers::NONE);
        editor.pointer_move(Point::new(to.0, to.1), Modifiers::NONE);
        editor.pointer_up(Point::new(to.0, to.1), Modifiers::NONE);
    }

    #[test]
    fn test_draw_commits_once() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (110.0, 60.0));
        assert_eq!(editor.document().len(), 1);
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.state(), InteractionState::Idle);
        assert!(editor.preview().is_none());
    }

    #[test]
    fn test_tool_switch_mid_drag_resets() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Circle);
        editor.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        editor.pointer_move(Point::new(50.0, 0.0), Modifiers::NONE);
        assert_eq!(editor.state(), InteractionState::Drawing);
        assert!(editor.preview().is_some());

        editor.set_tool(ToolKind::Select);
        assert_eq!(editor.state(), InteractionState::Idle);
        assert!(editor.preview().is_none());
        editor.pointer_up(Point::new(50.0, 0.0), Modifiers::NONE);
        assert!(editor.document().is_empty());
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_unknown_tool_name_is_ignored() {
        let mut editor = Editor::default();
        assert!(editor.set_tool_by_name("curved_path"));
        assert_eq!(editor.tool(), ToolKind::CurvedPath);
        assert!(!editor.set_tool_by_name("lasso"));
        assert_eq!(editor.tool(), ToolKind::CurvedPath);
    }

    #[test]
    fn test_undo_clears_selection() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Circle);
        drag(&mut editor, (100.0, 100.0), (140.0, 100.0));
        assert_eq!(editor.selection().len(), 1);
        assert!(editor.undo());
        assert!(editor.document().is_empty());
        assert!(editor.selection().is_empty());
        assert!(!editor.undo());
        assert!(editor.redo());
        assert_eq!(editor.document().len(), 1);
        assert!(!editor.redo());
    }

    #[test]
    fn test_duplicate_rehosts_internal_links() {
        let mut editor = Editor::default();
        let mut ctx_objects = Vec::new();
        let host = DiagramObject::placed(ObjectKind::Circle, Point::new(100.0, 100.0));
        let target = DiagramObject::placed(ObjectKind::Circle, Point::new(300.0, 100.0));
        let connector = crate::shapes::Connector::new(
            AttachmentPoint::on_host(&host, crate::shapes::EndpointRole::Source, Point::new(140.0, 100.0)),
            AttachmentPoint::on_host(&target, crate::shapes::EndpointRole::Target, Point::new(260.0, 100.0)),
            crate::routing::RouteStyle::Straight,
        );
        let connector = DiagramObject::new(Shape::Connector(connector));
        let (host_id, connector_id) = (host.id(), connector.id());
        ctx_objects.extend([host, target, connector]);
        editor.import_snapshot(DocumentSnapshot::new(ctx_objects, Viewport::default()));

        editor.ctx.selection.select_many([host_id, connector_id]);
        let copies = editor.duplicate_selected();
        assert_eq!(copies.len(), 2);
        assert_eq!(editor.document().len(), 5);
        let copy = editor.document().get(copies[1]).unwrap();
        let c = copy.as_connector().unwrap();
        assert_eq!(c.source.host(), Some(copies[0]));
        // Target host was not copied: that end is frozen
        assert!(!c.target.is_hosted());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_z_order_keeps_relative_order() {
        let mut editor = Editor::default();
        let objects: Vec<DiagramObject> = (0..4)
            .map(|i| DiagramObject::placed(ObjectKind::Rectangle, Point::new(i as f64 * 10.0, 0.0)))
            .collect();
        let ids: Vec<ObjectId> = objects.iter().map(DiagramObject::id).collect();
        editor.import_snapshot(DocumentSnapshot::new(objects, Viewport::default()));
        editor.ctx.selection.select_many([ids[0], ids[1]]);

        editor.bring_to_front_selected();
        assert_eq!(
            editor.document().ids().collect::<Vec<_>>(),
            vec![ids[2], ids[3], ids[0], ids[1]]
        );
        editor.send_to_back_selected();
        assert_eq!(editor.document().ids().collect::<Vec<_>>(), ids);
        assert_eq!(editor.history().len(), 3);
        // Already at the back: nothing to commit
        editor.send_to_back_selected();
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_signal_position_is_clamped_and_not_committed() {
        let mut editor = Editor::default();
        let connector = DiagramObject::placed(ObjectKind::Connector, Point::ZERO);
        let id = connector.id();
        editor.import_snapshot(DocumentSnapshot::new(vec![connector], Viewport::default()));
        assert!(editor.set_signal_position(id, 1.5));
        let c = editor.document().get(id).and_then(DiagramObject::as_connector).unwrap();
        assert!((c.signal_position - 1.0).abs() < f64::EPSILON);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_same_style_is_not_committed() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (110.0, 60.0));
        let id = editor.selection().single().unwrap();
        let current = editor.document().get(id).unwrap().style.clone();

        editor.set_style_of_selected(current.clone());
        assert_eq!(editor.history().len(), 2);

        let thicker = ShapeStyle {
            stroke_width: current.stroke_width + 2.0,
            ..current
        };
        editor.set_style_of_selected(thicker.clone());
        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.history().current_label(), Some("style"));
        editor.set_style_of_selected(thicker);
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_cycle_overlap_mid_drag_cancels() {
        let mut editor = Editor::default();
        let rect = DiagramObject::placed(ObjectKind::Rectangle, Point::ZERO);
        let id = rect.id();
        editor.import_snapshot(DocumentSnapshot::new(vec![rect], Viewport::default()));
        let before = editor.document().get(id).unwrap().clone();
        editor.set_tool(ToolKind::Select);

        editor.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
        editor.pointer_move(Point::new(40.0, 30.0), Modifiers::NONE);
        assert_eq!(editor.state(), InteractionState::Dragging);

        assert_eq!(editor.cycle_overlap(), None);
        assert_eq!(editor.state(), InteractionState::Idle);
        assert_eq!(editor.document().get(id), Some(&before));
        editor.pointer_up(Point::new(40.0, 30.0), Modifiers::NONE);
        assert_eq!(editor.document().get(id), Some(&before));
        assert_eq!(editor.history().len(), 1);
    }
}
