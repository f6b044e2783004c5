//! Pan tool: drags the viewport. Never touches the document.

use super::{EditorContext, InteractionState, Preview, Tool, ToolKind, Transition};
use crate::input::PointerInput;
use kurbo::Point;

#[derive(Debug, Default)]
pub struct PanTool {
    /// Last pointer position in screen space.
    last: Option<Point>,
}

impl PanTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for PanTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pan
    }

    fn on_enter(
        &mut self,
        _state: InteractionState,
        input: &PointerInput,
        _ctx: &mut EditorContext,
    ) -> Transition {
        self.last = Some(input.screen);
        Transition::Enter(InteractionState::Dragging)
    }

    fn on_pointer_move(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Option<Preview> {
        if state != InteractionState::Dragging {
            return None;
        }
        if let Some(last) = self.last.replace(input.screen) {
            ctx.viewport.pan(input.screen - last);
        }
        None
    }

    fn on_exit(
        &mut self,
        _state: InteractionState,
        _input: &PointerInput,
        _ctx: &mut EditorContext,
    ) -> Transition {
        self.last = None;
        Transition::Finish
    }

    fn cancel(&mut self, _ctx: &mut EditorContext) {
        self.last = None;
    }
}
