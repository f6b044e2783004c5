//! Error types for the text boundary of the editor engine.
//!
//! Editing operations never fail; they absorb invalid references, degenerate
//! geometry and stale handles locally. Only parsing snapshot or configuration
//! text and resolving tool or handle names can return an error.

use thiserror::Error;

/// Errors surfaced by the editor engine.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported snapshot version {found} (supported up to {supported})")]
    UnsupportedSnapshotVersion { found: u32, supported: u32 },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for editor operations that parse external input.
pub type EditorResult<T> = Result<T, EditorError>;
