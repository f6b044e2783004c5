//! Connector tool: a two-click sub-machine placing a connector between two hosts.

use super::{EditorContext, InteractionState, Preview, Tool, ToolKind, Transition};
use crate::input::PointerInput;
use crate::routing::route;
use crate::shapes::{AttachmentPoint, Connector, DiagramObject, EndpointRole, Shape};

#[derive(Debug, Default)]
pub struct ConnectTool {
    /// Endpoint captured by the first click, anchored on its host.
    source: Option<AttachmentPoint>,
}

impl ConnectTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn place(&mut self, input: &PointerInput, ctx: &mut EditorContext) -> Transition {
        let Some(source) = self.source.take() else {
            return Transition::Finish;
        };
        let target = ctx
            .host_at(input, None)
            .filter(|host| Some(host.id()) != source.host())
            .map(|host| AttachmentPoint::on_host(host, EndpointRole::Target, input.world));
        let Some(target) = target else {
            log::debug!("Connector cancelled: no target host under pointer");
            return Transition::Finish;
        };

        let connector = Connector::new(source, target, ctx.config.default_route);
        let mut object =
            DiagramObject::new(Shape::Connector(connector)).with_style(ctx.config.default_style.clone());
        object.finalize();
        let id = ctx.document.add(object);
        ctx.selection.select(id);
        Transition::Commit("connect")
    }
}

impl Tool for ConnectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Connector
    }

    fn on_enter(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition {
        match state {
            InteractionState::ConnectingSource | InteractionState::ConnectingTarget => {
                self.place(input, ctx)
            }
            _ => {
                let source = ctx
                    .host_at(input, None)
                    .map(|host| AttachmentPoint::on_host(host, EndpointRole::Source, input.world));
                match source {
                    Some(source) => {
                        self.source = Some(source);
                        Transition::Enter(InteractionState::ConnectingSource)
                    }
                    None => Transition::Stay,
                }
            }
        }
    }

    fn on_pointer_move(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Option<Preview> {
        if !matches!(
            state,
            InteractionState::ConnectingSource | InteractionState::ConnectingTarget
        ) {
            return None;
        }
        let source = self.source.as_ref()?;
        let target = ctx
            .host_at(input, None)
            .filter(|host| Some(host.id()) != source.host());
        let end = target.map_or(input.world, |host| host.attachment_point(input.world));
        let path = route(
            source.position(),
            end,
            ctx.config.default_route,
            crate::routing::DEFAULT_CURVATURE,
        );
        Some(Preview::Connector {
            path,
            source: source.host(),
            target: target.map(DiagramObject::id),
        })
    }

    fn on_exit(
        &mut self,
        state: InteractionState,
        _input: &PointerInput,
        _ctx: &mut EditorContext,
    ) -> Transition {
        match state {
            InteractionState::ConnectingSource => {
                Transition::Enter(InteractionState::ConnectingTarget)
            }
            InteractionState::ConnectingTarget => Transition::Stay,
            _ => Transition::Finish,
        }
    }

    fn cancel(&mut self, _ctx: &mut EditorContext) {
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::input::Modifiers;
    use crate::shapes::{Circle, ObjectId, ObjectKind};
    use kurbo::Point;

    fn input(x: f64, y: f64) -> PointerInput {
        PointerInput {
            screen: Point::new(x, y),
            world: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    fn ctx_with_hosts() -> (EditorContext, ObjectId, ObjectId) {
        let mut ctx = EditorContext::new(EditorConfig::default());
        let a = ctx
            .document
            .add(DiagramObject::new(Shape::Circle(Circle::new(Point::new(100.0, 100.0), 40.0))));
        let b = ctx
            .document
            .add(DiagramObject::placed(ObjectKind::Rectangle, Point::new(300.0, 60.0)));
        (ctx, a, b)
    }

    #[test]
    fn test_two_clicks_connect_hosts() {
        let (mut ctx, a, b) = ctx_with_hosts();
        let mut tool = ConnectTool::new();
        let t = tool.on_enter(InteractionState::Idle, &input(100.0, 60.0), &mut ctx);
        assert_eq!(t, Transition::Enter(InteractionState::ConnectingSource));
        let t = tool.on_exit(InteractionState::ConnectingSource, &input(100.0, 60.0), &mut ctx);
        assert_eq!(t, Transition::Enter(InteractionState::ConnectingTarget));

        let preview = tool.on_pointer_move(InteractionState::ConnectingTarget, &input(350.0, 100.0), &mut ctx);
        assert!(matches!(preview, Some(Preview::Connector { target: Some(t), .. }) if t == b));

        let t = tool.on_enter(InteractionState::ConnectingTarget, &input(350.0, 100.0), &mut ctx);
        assert_eq!(t, Transition::Commit("connect"));
        let id = ctx.selection.single().unwrap();
        let connector = ctx.document.get(id).and_then(DiagramObject::as_connector).unwrap();
        assert_eq!(connector.source.host(), Some(a));
        assert_eq!(connector.target.host(), Some(b));
        let start = connector.source.position();
        assert!((start.x - 100.0).abs() < 1e-9);
        assert!((start.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_space_cancels() {
        let (mut ctx, _, _) = ctx_with_hosts();
        let mut tool = ConnectTool::new();
        tool.on_enter(InteractionState::Idle, &input(100.0, 100.0), &mut ctx);
        tool.on_exit(InteractionState::ConnectingSource, &input(100.0, 100.0), &mut ctx);
        let t = tool.on_enter(InteractionState::ConnectingTarget, &input(1000.0, 1000.0), &mut ctx);
        assert_eq!(t, Transition::Finish);
        assert_eq!(ctx.document.len(), 2);
    }

    #[test]
    fn test_miss_in_idle_stays_idle() {
        let (mut ctx, _, _) = ctx_with_hosts();
        let mut tool = ConnectTool::new();
        assert_eq!(
            tool.on_enter(InteractionState::Idle, &input(1000.0, 1000.0), &mut ctx),
            Transition::Stay
        );
        assert_eq!(
            tool.on_exit(InteractionState::Idle, &input(1000.0, 1000.0), &mut ctx),
            Transition::Finish
        );
    }
}
