//! Undo/redo history for bounding box edits.
//!
//! Every edit records a full snapshot of the box list. The history is a
//! sequence of snapshots with a cursor pointing at the one currently shown:
//!
//! - `push` drops everything after the cursor (the stale redo branch) and appends.
//! - `undo` moves the cursor back, `redo` moves it forward.
//! - The oldest snapshots are evicted once `max_history` is exceeded.
//!
//! The history is never empty, so `0 <= cursor < len` always holds.

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::model::BoundingBox;

/// An immutable copy of the box list at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySnapshot {
    boxes: Vec<BoundingBox>,
}

impl HistorySnapshot {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Configuration for the history
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep (at least 1)
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Bounded snapshot log with a cursor.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: Vec<HistorySnapshot>,
    cursor: usize,
    config: HistoryConfig,
}

impl HistoryManager {
    /// Create a history seeded with an empty snapshot.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        let config = HistoryConfig {
            max_history: config.max_history.max(1),
        };
        Self {
            snapshots: vec![HistorySnapshot::default()],
            cursor: 0,
            config,
        }
    }

    /// Drop all history and start over from a single snapshot.
    ///
    /// Used on image load so that undo can never go past the loaded state.
    pub fn reset(&mut self, initial: HistorySnapshot) {
        log::debug!("🗑️ History reset with {} boxes", initial.len());
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.cursor = 0;
    }

    /// Record a new snapshot after an edit.
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        if self.cursor + 1 < self.snapshots.len() {
            let discarded = self.snapshots.len() - (self.cursor + 1);
            self.snapshots.truncate(self.cursor + 1);
            log::debug!("Discarded {} redo snapshots", discarded);
        }

        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;

        // Limit history size
        while self.snapshots.len() > self.config.max_history {
            self.snapshots.remove(0);
            self.cursor -= 1;
        }

        log::debug!(
            "📝 History: pushed snapshot {} of {}",
            self.cursor + 1,
            self.snapshots.len()
        );
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Step back one snapshot. Returns the snapshot to restore, or `None` if
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_undo() {
            log::debug!("Nothing to undo");
            return None;
        }
        self.cursor -= 1;
        log::debug!("⏪ Undo: now at snapshot {}", self.cursor + 1);
        self.snapshots.get(self.cursor)
    }

    /// Step forward one snapshot. Returns the snapshot to restore, or `None`
    /// if there is nothing to redo.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_redo() {
            log::debug!("Nothing to redo");
            return None;
        }
        self.cursor += 1;
        log::debug!("⏩ Redo: now at snapshot {}", self.cursor + 1);
        self.snapshots.get(self.cursor)
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`: the history holds at least the seed snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.config.max_history
    }

    /// Get the number of steps that can be undone
    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    /// Get the number of steps that can be redone
    pub fn redo_count(&self) -> usize {
        self.snapshots.len() - 1 - self.cursor
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}
