//! Bounded undo/redo history of annotation snapshots
//!
//! Linear history: committing after an undo discards the redo branch. When
//! the cap is exceeded the oldest snapshot is evicted, and the retained
//! oldest snapshot becomes the new origin.

use std::collections::VecDeque;

use crate::domain::Annotation;

/// Default number of snapshots retained, origin included
pub const DEFAULT_CAPACITY: usize = 50;

/// Whether history may currently record commits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryMode {
    /// Normal editing; commits are recorded
    #[default]
    Editing,
    /// An undo/redo snapshot is being installed; commits are rejected
    Replaying,
}

#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Annotation>,
    cursor: usize,
    capacity: usize,
    mode: HistoryMode,
}

impl History {
    /// Start a history whose origin is `origin`
    pub fn new(origin: Annotation, capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::from([origin]),
            cursor: 0,
            capacity: capacity.max(1),
            mode: HistoryMode::Editing,
        }
    }

    /// Drop everything and restart from `origin`
    pub fn reset(&mut self, origin: Annotation) {
        self.snapshots.clear();
        self.snapshots.push_back(origin);
        self.cursor = 0;
        self.mode = HistoryMode::Editing;
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the cap, dropping the oldest undo states first and then redo states
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.snapshots.len() > self.capacity && self.cursor > 0 {
            self.snapshots.pop_front();
            self.cursor -= 1;
        }
        self.snapshots.truncate(self.capacity);
    }

    /// Number of retained snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Snapshot at the cursor
    pub fn current(&self) -> Option<&Annotation> {
        self.snapshots.get(self.cursor)
    }

    /// Record a new snapshot. Returns false (and records nothing) while replaying.
    pub fn commit(&mut self, snapshot: Annotation) -> bool {
        if self.mode == HistoryMode::Replaying {
            log::warn!("ignoring history commit during undo/redo replay");
            return false;
        }

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        log::debug!(
            "history commit: {} snapshots, cursor {}",
            self.snapshots.len(),
            self.cursor
        );
        true
    }

    /// Step back; returns a clone of the snapshot to install and enters replay mode
    pub fn undo(&mut self) -> Option<Annotation> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.begin_replay()
    }

    /// Step forward; returns a clone of the snapshot to install and enters replay mode
    pub fn redo(&mut self) -> Option<Annotation> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.begin_replay()
    }

    fn begin_replay(&mut self) -> Option<Annotation> {
        self.mode = HistoryMode::Replaying;
        log::debug!("history replay to cursor {}", self.cursor);
        self.snapshots.get(self.cursor).cloned()
    }

    /// Leave replay mode once the snapshot is installed
    pub fn finish_replay(&mut self) {
        self.mode = HistoryMode::Editing;
    }
}
