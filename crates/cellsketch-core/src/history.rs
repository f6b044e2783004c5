//! Linear undo/redo over whole-document snapshots.

use crate::shapes::DiagramObject;
use std::collections::VecDeque;

/// Default number of retained history entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded ring of document states with a cursor.
///
/// Each entry is the object sequence *after* a committed action; the entry at
/// `index` always equals the live document between actions. The first entry is
/// the state the editor started from (or the last imported snapshot).
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Vec<DiagramObject>>,
    /// Action label per entry, for logging.
    labels: VecDeque<&'static str>,
    index: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(initial: Vec<DiagramObject>, capacity: usize) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1));
        entries.push_back(initial);
        let mut labels = VecDeque::with_capacity(capacity.max(1));
        labels.push_back("initial");
        Self {
            entries,
            labels,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record the post-action state, discarding any redo branch.
    pub fn commit(&mut self, objects: Vec<DiagramObject>, label: &'static str) {
        self.entries.truncate(self.index + 1);
        self.labels.truncate(self.index + 1);
        self.entries.push_back(objects);
        self.labels.push_back(label);
        self.index = self.entries.len() - 1;

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.labels.pop_front();
            self.index = self.index.saturating_sub(1);
        }
        log::debug!(
            "History commit '{label}' ({}/{})",
            self.index + 1,
            self.entries.len()
        );
    }

    /// Step back; returns a copy of the state to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Vec<DiagramObject>> {
        if !self.can_undo() {
            log::debug!("Nothing to undo");
            return None;
        }
        let undone = self.labels.get(self.index).copied().unwrap_or_default();
        self.index -= 1;
        log::debug!("Undo '{undone}'");
        self.entries.get(self.index).cloned()
    }

    /// Step forward; returns a copy of the state to restore, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Vec<DiagramObject>> {
        if !self.can_redo() {
            log::debug!("Nothing to redo");
            return None;
        }
        self.index += 1;
        log::debug!(
            "Redo '{}'",
            self.labels.get(self.index).copied().unwrap_or_default()
        );
        self.entries.get(self.index).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of stored entries, including the initial one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The state at the cursor.
    pub fn current(&self) -> Option<&[DiagramObject]> {
        self.entries.get(self.index).map(Vec::as_slice)
    }

    /// Label of the action that produced the entry at the cursor.
    pub fn current_label(&self) -> Option<&'static str> {
        self.labels.get(self.index).copied()
    }

    /// Drop everything and start over from `objects`.
    pub fn reset(&mut self, objects: Vec<DiagramObject>) {
        self.entries.clear();
        self.labels.clear();
        self.entries.push_back(objects);
        self.labels.push_back("initial");
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ObjectKind;
    use kurbo::Point;

    fn state(n: usize) -> Vec<DiagramObject> {
        (0..n)
            .map(|i| DiagramObject::placed(ObjectKind::Circle, Point::new(i as f64, 0.0)))
            .collect()
    }

    #[test]
    fn test_starts_with_initial_entry() {
        let history = History::default();
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current_label(), Some("initial"));
    }

    #[test]
    fn test_undo_redo_boundaries() {
        let mut history = History::new(state(0), 10);
        assert!(history.undo().is_none());
        history.commit(state(1), "add");
        assert_eq!(history.undo().map(|s| s.len()), Some(0));
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(|s| s.len()), Some(1));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut history = History::new(state(0), 50);
        for n in 1..=5 {
            history.commit(state(n), "edit");
        }
        for _ in 0..3 {
            assert!(history.undo().is_some());
        }
        history.commit(state(9), "branch");
        assert_eq!(history.len(), 1 + 2 + 1);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.current().map(<[_]>::len), Some(9));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(state(0), 3);
        for n in 1..=5 {
            history.commit(state(n), "edit");
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        // Oldest surviving entry is the third commit
        history.undo();
        assert_eq!(history.undo().map(|s| s.len()), Some(3));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(state(0), 5);
        history.commit(state(1), "edit");
        history.reset(state(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current().map(<[_]>::len), Some(2));
    }
}
