//! Tools and the interaction state machine they drive.

mod connect;
mod draw;
mod pan;
mod select;

pub use connect::ConnectTool;
pub use draw::DrawTool;
pub use pan::PanTool;
pub use select::SelectTool;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::EditorError;
use crate::hit_test::{HitMode, OverlapCycle};
use crate::history::History;
use crate::input::{Modifiers, PointerInput};
use crate::routing::ConnectorPath;
use crate::selection::Selection;
use crate::shapes::{DiagramObject, ObjectId, ObjectKind};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single active interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing,
    Dragging,
    Resizing,
    Rotating,
    BoxSelecting,
    ConnectingSource,
    ConnectingTarget,
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Circle,
    Rectangle,
    Polygon,
    Line,
    TaperedLine,
    CurvedPath,
    Freehand,
    Text,
    Image,
    Container,
    Connector,
}

impl ToolKind {
    pub const ALL: [ToolKind; 13] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Circle,
        ToolKind::Rectangle,
        ToolKind::Polygon,
        ToolKind::Line,
        ToolKind::TaperedLine,
        ToolKind::CurvedPath,
        ToolKind::Freehand,
        ToolKind::Text,
        ToolKind::Image,
        ToolKind::Container,
        ToolKind::Connector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Circle => "circle",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Polygon => "polygon",
            ToolKind::Line => "line",
            ToolKind::TaperedLine => "tapered_line",
            ToolKind::CurvedPath => "curved_path",
            ToolKind::Freehand => "freehand",
            ToolKind::Text => "text",
            ToolKind::Image => "image",
            ToolKind::Container => "container",
            ToolKind::Connector => "connector",
        }
    }

    /// Object kind created by a drawing tool.
    pub fn object_kind(self) -> Option<ObjectKind> {
        match self {
            ToolKind::Circle => Some(ObjectKind::Circle),
            ToolKind::Rectangle => Some(ObjectKind::Rectangle),
            ToolKind::Polygon => Some(ObjectKind::Polygon),
            ToolKind::Line => Some(ObjectKind::Line),
            ToolKind::TaperedLine => Some(ObjectKind::TaperedLine),
            ToolKind::CurvedPath => Some(ObjectKind::CurvedPath),
            ToolKind::Freehand => Some(ObjectKind::Freehand),
            ToolKind::Text => Some(ObjectKind::TextBox),
            ToolKind::Image => Some(ObjectKind::Image),
            ToolKind::Container => Some(ObjectKind::Container),
            ToolKind::Select | ToolKind::Pan | ToolKind::Connector => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EditorError::UnknownTool(s.to_string()))
    }
}

/// What the editor should do after a tool callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current state.
    Stay,
    /// Move to another state.
    Enter(InteractionState),
    /// The action is complete and changed the document: commit once, then go Idle.
    Commit(&'static str),
    /// The action is complete without a document change: go Idle.
    Finish,
}

/// In-progress geometry for the renderer to draw before commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Object being drawn.
    Object(DiagramObject),
    /// Connector being placed, with the hosts it would attach to.
    Connector {
        path: ConnectorPath,
        source: Option<ObjectId>,
        target: Option<ObjectId>,
    },
    /// Drag rectangle of a box selection.
    SelectionBox(Rect),
    /// Rotation guide: pivot and current angle in degrees.
    Rotation { center: Point, angle: f64 },
}

/// Everything a tool may read or mutate, passed explicitly to every callback.
#[derive(Debug, Clone)]
pub struct EditorContext {
    pub document: Document,
    pub selection: Selection,
    pub viewport: Viewport,
    pub history: History,
    pub config: EditorConfig,
    /// Stack recorded by the last click on overlapping objects.
    pub cycle: Option<OverlapCycle>,
}

impl EditorContext {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            document: Document::new(),
            selection: Selection::new(),
            viewport: Viewport::with_zoom_range(config.min_zoom, config.max_zoom),
            history: History::new(Vec::new(), config.history_capacity),
            config,
            cycle: None,
        }
    }

    /// Object pick tolerance in world units.
    pub fn hit_tolerance(&self) -> f64 {
        self.viewport.screen_len_to_world(self.config.hit_tolerance)
    }

    /// Handle pick radius in world units, constant on screen.
    pub fn handle_radius(&self) -> f64 {
        self.viewport.screen_len_to_world(self.config.handle_hit_radius)
    }

    pub fn hit_mode(&self, modifiers: Modifiers) -> HitMode {
        if modifiers.exact_hit() {
            HitMode::Exact
        } else {
            self.config.default_hit_mode
        }
    }

    /// Topmost object under the pointer that can host a connector endpoint.
    pub fn host_at(&self, input: &PointerInput, exclude: Option<ObjectId>) -> Option<&DiagramObject> {
        let mode = self.hit_mode(input.modifiers);
        crate::hit_test::objects_at_point(&self.document, input.world, mode, self.hit_tolerance())
            .into_iter()
            .filter(|&id| Some(id) != exclude)
            .filter_map(|id| self.document.get(id))
            .find(|o| o.can_host())
    }

    /// Objects attached to any of `ids`, transitively, excluding `ids` themselves.
    pub fn dependents_of(&self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let mut moving: Vec<ObjectId> = ids.to_vec();
        let mut dependents = Vec::new();
        loop {
            let found: Vec<ObjectId> = self
                .document
                .objects()
                .iter()
                .filter(|o| !moving.contains(&o.id()))
                .filter(|o| o.attached_host.is_some_and(|h| moving.contains(&h)))
                .map(DiagramObject::id)
                .collect();
            if found.is_empty() {
                return dependents;
            }
            moving.extend_from_slice(&found);
            dependents.extend(found);
        }
    }

    /// Remove objects and restore every reference invariant before returning:
    /// connector endpoints hosted on them are frozen, dependents are released,
    /// and the selection and overlap cycle forget them.
    pub fn remove_objects(&mut self, ids: &[ObjectId]) -> usize {
        let mut removed = 0;
        for &id in ids {
            if self.document.remove(id).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.document.refresh_attachments();
            self.document.release_dangling_hosts();
            self.selection.retain_existing(&self.document);
            self.cycle = None;
        }
        removed
    }

    /// Push the live document as one history entry.
    pub fn commit(&mut self, label: &'static str) {
        self.document.refresh_attachments();
        self.history.commit(self.document.objects().to_vec(), label);
    }
}

/// A tool drives the state machine for the states it participates in.
///
/// Callbacks receive the current state; the editor applies the returned
/// [`Transition`], so tools never commit history themselves.
pub trait Tool: fmt::Debug {
    fn kind(&self) -> ToolKind;

    /// Pointer pressed.
    fn on_enter(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition;

    /// Pointer moved; returns what to draw for the in-progress interaction.
    fn on_pointer_move(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Option<Preview>;

    /// Pointer released.
    fn on_exit(
        &mut self,
        state: InteractionState,
        input: &PointerInput,
        ctx: &mut EditorContext,
    ) -> Transition;

    /// Abandon the interaction, restoring anything edited live.
    fn cancel(&mut self, ctx: &mut EditorContext);
}

/// Fresh tool instance for `kind`.
pub fn tool_for(kind: ToolKind) -> Box<dyn Tool> {
    match kind {
        ToolKind::Select => Box::new(SelectTool::new()),
        ToolKind::Pan => Box::new(PanTool::new()),
        ToolKind::Connector => Box::new(ConnectTool::new()),
        other => match other.object_kind() {
            Some(object) => Box::new(DrawTool::new(other, object)),
            None => Box::new(SelectTool::new()),
        },
    }
}

/// Pointer travel in screen units, compared against the click threshold.
pub(crate) fn exceeds_click(ctx: &EditorContext, press_screen: Point, input: &PointerInput) -> bool {
    (input.screen - press_screen).hypot() >= ctx.config.click_threshold
}
