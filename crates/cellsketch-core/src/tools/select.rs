//! Select tool: pick, move, resize, rotate and box-select objects.

use super::{EditorContext, InteractionState, Preview, Tool, ToolKind, Transition, exceeds_click};
use crate::handles::{HandleKind, hit_test_handle};
use crate::hit_test::{OverlapCycle, objects_at_point, objects_in_rect};
use crate::input::PointerInput;
use crate::manipulation::{apply_resize, rotation_for_drag};
use crate::shapes::{AttachmentPoint, DiagramObject, EndpointRole, ObjectId};
use kurbo::{Point, Rect};

/// Live edit in progress, with the pre-edit copies needed to cancel it.
#[derive(Debug, Clone)]
enum Action {
    Move {
        start: Point,
        press_screen: Point,
        originals: Vec<DiagramObject>,
        moved: bool,
        /// Hits under the press, topmost first, for overlap cycling.
        hits: Vec<ObjectId>,
        clicked: ObjectId,
    },
    Resize {
        start: Point,
        press_screen: Point,
        handle: HandleKind,
        original: DiagramObject,
        moved: bool,
    },
    Rotate {
        start: Point,
        press_screen: Point,
        original: DiagramObject,
        moved: bool,
    },
    BoxSelect {
        start: Point,
        current: Point,
        base: Vec<ObjectId>,
    },
}

#[derive(Debug, Default)]
pub struct SelectTool {
    action: Option<Action>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of a selected object under the pointer.
    fn handle_under(ctx: &EditorContext, point: Point) -> Option<(DiagramObject, HandleKind)> {
        let radius = ctx.handle_radius();
        ctx.selection.iter().find_map(|id| {
            let object = ctx.document.get(id)?;
            hit_test_handle(object, point, radius).map(|handle| (object.clone(), handle))
        })
    }

    fn press(&mut self, input: &PointerInput, ctx: &mut EditorContext) -> Transition {
        let point = input.world;

        if let Some((original, handle)) = Self::handle_under(ctx, point) {
            log::debug!("Grabbed handle {handle} of {}", original.id());
            if handle == HandleKind::Rotate {
                self.action = Some(Action::Rotate {
                    start: point,
                    press_screen: input.screen,
                    original,
                    moved: false,
                });
                return Transition::Enter(InteractionState::Rotating);
            }
            self.action = Some(Action::Resize {
                start: point,
                press_screen: input.screen,
                handle,
                original,
                moved: false,
            });
            return Transition::Enter(InteractionState::Resizing);
        }

        let mode = ctx.hit_mode(input.modifiers);
        let hits = objects_at_point(&ctx.document, point, mode, ctx.hit_tolerance());
        let Some(&clicked) = hits.first() else {
            if !input.modifiers.additive() {
                ctx.selection.clear();
            }
            self.action = Some(Action::BoxSelect {
                start: point,
                current: point,
                base: ctx.selection.ids().to_vec(),
            });
            return Transition::Enter(InteractionState::BoxSelecting);
        };

        if input.modifiers.additive() {
            ctx.selection.toggle(clicked);
            return Transition::Stay;
        }
        if !ctx.selection.contains(clicked) {
            ctx.selection.select(clicked);
        }

        let mut ids: Vec<ObjectId> = ctx.selection.ids().to_vec();
        ids.extend(ctx.dependents_of(&ids));
        let originals = ids
            .iter()
            .filter_map(|&id| ctx.document.get(id).cloned())
            .collect();
        self.action = Some(Action::Move {
            start: point,
            press_screen: input.screen,
            originals,
            moved: false,
            hits,
            clicked,
        });
        Transition::Enter(InteractionState::Dragging)
    }

    /// Put pre-edit copies back into the document.
    fn restore(ctx: &mut EditorContext, originals: &[DiagramObject]) {
        for original in originals {
            if let Some(object) = ctx.document.get_mut(original.id()) {
                *object = original.clone();
            }
        }
        ctx.document.refresh_attachments();
    }

    /// Attach a dragged connector endpoint to whatever host it was dropped on.
    fn rehost_endpoint(ctx: &mut EditorContext, id: ObjectId, handle: HandleKind, input: &PointerInput) {
        let role = match handle {
            HandleKind::Start => EndpointRole::Source,
            HandleKind::End => EndpointRole::Target,
            _ => return,
        };
        let Some(connector) = ctx.document.get(id).and_then(DiagramObject::as_connector) else {
            return;
        };
        // The opposite end's host is excluded so a connector never loops onto one object.
        let other_host = match role {
            EndpointRole::Source => connector.target.host(),
            EndpointRole::Target => connector.source.host(),
        };
        let attachment = ctx
            .host_at(input, Some(id))
            .filter(|host| Some(host.id()) != other_host)
            .map(|host| AttachmentPoint::on_host(host, role, input.world));
        if let Some(attachment) = attachment {
            if let Some(connector) = ctx.document.get_mut(id).and_then(DiagramObject::as_connector_mut) {
                *connector.endpoint_mut(role) = attachment;
            }
        }
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_enter(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition {
        if state != InteractionState::Idle {
            // A press without a release in between: drop the stale gesture first
            self.cancel(ctx);
        }
        self.press(input, ctx)
    }

    fn on_pointer_move(
        &mut self,
        _state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Option<Preview> {
        let point = input.world;
        match self.action.as_mut()? {
            Action::Move {
                start,
                press_screen,
                originals,
                moved,
                ..
            } => {
                *moved = *moved || exceeds_click(ctx, *press_screen, input);
                if !*moved {
                    return None;
                }
                let delta = point - *start;
                for original in originals.iter() {
                    if let Some(object) = ctx.document.get_mut(original.id()) {
                        *object = original.clone();
                        object.translate(delta);
                    }
                }
                ctx.document.refresh_attachments();
                None
            }
            Action::Resize {
                start,
                press_screen,
                handle,
                original,
                moved,
            } => {
                *moved = *moved || exceeds_click(ctx, *press_screen, input);
                if !*moved {
                    return None;
                }
                let keep_aspect = input.modifiers.constrain();
                match apply_resize(original, *handle, point - *start, keep_aspect) {
                    Some(resized) => {
                        if let Some(object) = ctx.document.get_mut(original.id()) {
                            *object = resized;
                        }
                        ctx.document.refresh_attachments();
                    }
                    None => log::warn!("Handle {handle} does not apply to {}", original.kind()),
                }
                None
            }
            Action::Rotate {
                start,
                press_screen,
                original,
                moved,
            } => {
                *moved = *moved || exceeds_click(ctx, *press_screen, input);
                if !*moved {
                    return None;
                }
                let snap = input
                    .modifiers
                    .constrain()
                    .then_some(ctx.config.rotation_snap_degrees);
                let rotation = rotation_for_drag(original, *start, point, snap);
                if let Some(object) = ctx.document.get_mut(original.id()) {
                    object.rotation = rotation;
                }
                ctx.document.refresh_attachments();
                Some(Preview::Rotation {
                    center: original.center(),
                    angle: rotation,
                })
            }
            Action::BoxSelect {
                start,
                current,
                base,
            } => {
                *current = point;
                let rect = Rect::from_points(*start, *current);
                let mut ids = base.clone();
                ids.extend(objects_in_rect(&ctx.document, rect));
                ctx.selection.select_many(ids);
                Some(Preview::SelectionBox(rect))
            }
        }
    }

    fn on_exit(
        &mut self,
        _state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition {
        let Some(action) = self.action.take() else {
            return Transition::Finish;
        };
        match action {
            Action::Move {
                start,
                originals,
                moved,
                hits,
                clicked,
                ..
            } => {
                if moved {
                    // Hosted connector ends snap back, so a drag can end where it began
                    let changed = originals
                        .iter()
                        .any(|o| ctx.document.get(o.id()) != Some(o));
                    return if changed {
                        Transition::Commit("move")
                    } else {
                        Transition::Finish
                    };
                }
                // A click: the document is untouched, so the stack stays valid
                ctx.cycle = OverlapCycle::record(start, hits, clicked, ctx.document.revision());
                Transition::Finish
            }
            Action::Resize {
                handle,
                original,
                moved,
                ..
            } => {
                // A stale handle leaves the object untouched: nothing to commit
                if !moved || ctx.document.get(original.id()) == Some(&original) {
                    return Transition::Finish;
                }
                if original.as_connector().is_some() {
                    Self::rehost_endpoint(ctx, original.id(), handle, input);
                }
                Transition::Commit("resize")
            }
            Action::Rotate { moved, .. } => {
                if !moved {
                    return Transition::Finish;
                }
                Transition::Commit("rotate")
            }
            Action::BoxSelect { .. } => Transition::Finish,
        }
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        match self.action.take() {
            Some(Action::Move { originals, .. }) => Self::restore(ctx, &originals),
            Some(Action::Resize { original, .. }) | Some(Action::Rotate { original, .. }) => {
                Self::restore(ctx, std::slice::from_ref(&original))
            }
            Some(Action::BoxSelect { base, .. }) => ctx.selection.select_many(base),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::input::Modifiers;
    use crate::shapes::ObjectKind;

    fn input(x: f64, y: f64) -> PointerInput {
        PointerInput {
            screen: Point::new(x, y),
            world: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn ctx_with_rect() -> (EditorContext, ObjectId) {
        let mut ctx = EditorContext::new(EditorConfig::default());
        let id = ctx.document.add(DiagramObject::placed(ObjectKind::Rectangle, Point::ZERO));
        (ctx, id)
    }

    #[test]
    fn test_press_on_object_starts_drag() {
        let (mut ctx, id) = ctx_with_rect();
        let mut tool = SelectTool::new();
        let t = tool.on_enter(InteractionState::Idle, &input(10.0, 10.0), &mut ctx);
        assert_eq!(t, Transition::Enter(InteractionState::Dragging));
        assert_eq!(ctx.selection.single(), Some(id));

        tool.on_pointer_move(InteractionState::Dragging, &input(30.0, 20.0), &mut ctx);
        let t = tool.on_exit(InteractionState::Dragging, &input(30.0, 20.0), &mut ctx);
        assert_eq!(t, Transition::Commit("move"));
        let bounds = ctx.document.get(id).unwrap().bounds();
        assert!((bounds.x0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_click_does_not_commit() {
        let (mut ctx, id) = ctx_with_rect();
        let before = ctx.document.get(id).cloned();
        let mut tool = SelectTool::new();
        tool.on_enter(InteractionState::Idle, &input(10.0, 10.0), &mut ctx);
        tool.on_pointer_move(InteractionState::Dragging, &input(11.0, 11.0), &mut ctx);
        let t = tool.on_exit(InteractionState::Dragging, &input(11.0, 11.0), &mut ctx);
        assert_eq!(t, Transition::Finish);
        assert_eq!(ctx.document.get(id).cloned(), before);
    }

    #[test]
    fn test_shift_press_toggles() {
        let (mut ctx, id) = ctx_with_rect();
        let mut tool = SelectTool::new();
        let shifted = PointerInput {
            modifiers: Modifiers::SHIFT,
            ..input(10.0, 10.0)
        };
        assert_eq!(tool.on_enter(InteractionState::Idle, &shifted, &mut ctx), Transition::Stay);
        assert!(ctx.selection.contains(id));
        tool.on_enter(InteractionState::Idle, &shifted, &mut ctx);
        assert!(ctx.selection.is_empty());
    }

    #[test]
    fn test_box_select_and_cancel() {
        let (mut ctx, id) = ctx_with_rect();
        let mut tool = SelectTool::new();
        let t = tool.on_enter(InteractionState::Idle, &input(-50.0, -50.0), &mut ctx);
        assert_eq!(t, Transition::Enter(InteractionState::BoxSelecting));
        let preview = tool.on_pointer_move(InteractionState::BoxSelecting, &input(5.0, 5.0), &mut ctx);
        assert!(matches!(preview, Some(Preview::SelectionBox(_))));
        assert_eq!(ctx.selection.single(), Some(id));
        tool.cancel(&mut ctx);
        assert!(ctx.selection.is_empty());
    }

    #[test]
    fn test_cancel_restores_resize() {
        let (mut ctx, id) = ctx_with_rect();
        ctx.selection.select(id);
        let before = ctx.document.get(id).cloned();
        let mut tool = SelectTool::new();
        // South-east handle of the 120x80 default rectangle
        let t = tool.on_enter(InteractionState::Idle, &input(120.0, 80.0), &mut ctx);
        assert_eq!(t, Transition::Enter(InteractionState::Resizing));
        tool.on_pointer_move(InteractionState::Resizing, &input(200.0, 200.0), &mut ctx);
        assert_ne!(ctx.document.get(id).cloned(), before);
        tool.cancel(&mut ctx);
        assert_eq!(ctx.document.get(id).cloned(), before);
    }
}
