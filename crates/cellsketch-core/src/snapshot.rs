//! Flat snapshot of the document and viewport for persistence collaborators.

use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::shapes::{DiagramObject, ObjectId};
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Newest snapshot layout this build reads and writes.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<DiagramObject>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for DocumentSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            objects: Vec::new(),
            viewport: Viewport::default(),
        }
    }
}

impl DocumentSnapshot {
    pub fn new(objects: Vec<DiagramObject>, viewport: Viewport) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            objects,
            viewport,
        }
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, rejecting layouts newer than this build understands.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(EditorError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Repair a loaded snapshot so every document invariant holds.
    ///
    /// Duplicate ids keep their first occurrence, objects are finalized,
    /// endpoints on missing or connector hosts are frozen, dangling host links
    /// are cleared and the zoom is clamped into `[min_zoom, max_zoom]`.
    pub fn into_document(self, min_zoom: f64, max_zoom: f64) -> (Document, Viewport) {
        let mut seen: HashSet<ObjectId> = HashSet::with_capacity(self.objects.len());
        let mut objects = Vec::with_capacity(self.objects.len());
        for mut object in self.objects {
            if !seen.insert(object.id()) {
                log::warn!("Dropping object with duplicate id {}", object.id());
                continue;
            }
            object.finalize();
            objects.push(object);
        }

        let mut document = Document::from_objects(objects);
        document.release_dangling_hosts();
        document.refresh_attachments();

        let mut viewport = self.viewport;
        viewport.normalize(min_zoom, max_zoom);
        (document, viewport)
    }
}
