//! CellSketch Core Library
//!
//! Platform-agnostic editor engine for CellSketch diagrams: the object model,
//! viewport transform, hit-testing, tool state machine and undo history.
//! Rendering, persistence formats and UI bindings live in the embedding
//! application and talk to the engine through [`Editor`].

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod handles;
pub mod history;
pub mod hit_test;
pub mod input;
pub mod manipulation;
pub mod routing;
pub mod selection;
pub mod shapes;
pub mod snapshot;
pub mod tools;
pub mod viewport;

pub use config::EditorConfig;
pub use document::Document;
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use handles::{Corner, Edge, Handle, HandleKind};
pub use history::History;
pub use hit_test::{HitMode, OverlapCycle};
pub use input::{Modifiers, PointerEvent, PointerInput};
pub use routing::{ConnectorPath, RouteStyle};
pub use selection::Selection;
pub use shapes::{AttachmentPoint, DiagramObject, ObjectId, ObjectKind, Shape, ShapeStyle};
pub use snapshot::DocumentSnapshot;
pub use tools::{EditorContext, InteractionState, Preview, Tool, ToolKind, Transition};
pub use viewport::Viewport;
