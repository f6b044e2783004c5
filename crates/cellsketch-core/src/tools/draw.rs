//! Drawing tools: one instance per placeable object kind.

use super::{EditorContext, InteractionState, Preview, Tool, ToolKind, Transition, exceeds_click};
use crate::hit_test::{HitMode, objects_at_point};
use crate::input::PointerInput;
use crate::shapes::{DiagramObject, Draft, ObjectId, ObjectKind, Shape};
use kurbo::Point;

#[derive(Debug)]
pub struct DrawTool {
    tool: ToolKind,
    object: ObjectKind,
    draft: Option<Draft>,
    press_screen: Point,
    /// Pointer left the click radius; until then the draft keeps its default size.
    dragged: bool,
}

impl DrawTool {
    pub fn new(tool: ToolKind, object: ObjectKind) -> Self {
        Self {
            tool,
            object,
            draft: None,
            press_screen: Point::ZERO,
            dragged: false,
        }
    }

    /// Topmost closed object under `point` that a new text box should follow.
    fn label_host(ctx: &EditorContext, point: Point) -> Option<ObjectId> {
        objects_at_point(&ctx.document, point, HitMode::Loose, 0.0)
            .into_iter()
            .filter_map(|id| ctx.document.get(id))
            .find(|o| o.can_host() && !o.is_line_like() && !matches!(o.shape, Shape::TextBox(_)))
            .map(DiagramObject::id)
    }
}

impl Tool for DrawTool {
    fn kind(&self) -> ToolKind {
        self.tool
    }

    fn on_enter(
        &mut self,
        _state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition {
        self.draft = Some(Draft::new(
            self.object,
            input.world,
            ctx.config.default_style.clone(),
        ));
        self.press_screen = input.screen;
        self.dragged = false;
        log::debug!("Drawing {} at {:?}", self.object, input.world);
        Transition::Enter(InteractionState::Drawing)
    }

    fn on_pointer_move(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Option<Preview> {
        if state != InteractionState::Drawing {
            return None;
        }
        let draft = self.draft.as_mut()?;
        self.dragged = self.dragged || exceeds_click(ctx, self.press_screen, input);
        if self.dragged {
            draft.update(input.world, input.modifiers.constrain());
        }
        Some(Preview::Object(draft.object().clone()))
    }

    fn on_exit(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition {
        if state != InteractionState::Drawing {
            return Transition::Finish;
        }
        let Some(mut draft) = self.draft.take() else {
            return Transition::Finish;
        };
        if self.dragged || exceeds_click(ctx, self.press_screen, input) {
            draft.update(input.world, input.modifiers.constrain());
        }

        let mut object = draft.finalize();
        if let Shape::Freehand(freehand) = &mut object.shape {
            freehand.simplify(ctx.config.freehand_simplify_tolerance);
            object.finalize();
        }
        if matches!(object.shape, Shape::TextBox(_)) {
            object.attached_host = Self::label_host(ctx, object.center());
        }

        let id = ctx.document.add(object);
        ctx.selection.select(id);
        Transition::Commit("draw")
    }

    fn cancel(&mut self, _ctx: &mut EditorContext) {
        self.draft = None;
        self.dragged = false;
    }
}
