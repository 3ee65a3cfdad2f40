//! Bounding box storage for the image currently on the canvas.
//!
//! Boxes are kept in insertion order; that order is both the draw order and
//! the hit-test order. Every mutation records a snapshot in the store's
//! [`HistoryManager`](crate::history::HistoryManager).

use thiserror::Error;

use crate::history::{HistoryConfig, HistoryManager, HistorySnapshot};
use crate::model::{BoundingBox, ClassId, Point};
use crate::viewport::ViewportTransform;

/// Errors from index-based store edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No box at the given index
    #[error("Box index {index} out of range (store holds {len} boxes)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of boxes in the store
        len: usize,
    },
}

/// Ordered box list with selection and undo/redo history.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    boxes: Vec<BoundingBox>,
    selected: Option<usize>,
    history: HistoryManager,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose history keeps at most `max_history` snapshots.
    pub fn with_history_limit(max_history: usize) -> Self {
        Self {
            boxes: Vec::new(),
            selected: None,
            history: HistoryManager::with_config(HistoryConfig { max_history }),
        }
    }

    /// Replace the whole list and reseed history with it.
    ///
    /// This is the image-load path: it is not an edit and cannot be undone.
    pub fn load(&mut self, boxes: Vec<BoundingBox>) {
        log::debug!("Loaded {} boxes into store", boxes.len());
        self.history.reset(HistorySnapshot::new(boxes.clone()));
        self.boxes = boxes;
        self.selected = None;
    }

    /// Append a box and return its index.
    pub fn add(&mut self, bbox: BoundingBox) -> usize {
        self.boxes.push(bbox);
        self.record();
        let index = self.boxes.len() - 1;
        log::debug!("➕ Added box {} (class {})", index, bbox.class_id);
        index
    }

    /// Replace the box at `index`.
    pub fn update(&mut self, index: usize, bbox: BoundingBox) -> Result<(), StoreError> {
        let slot = self.slot_mut(index)?;
        *slot = bbox;
        self.record();
        log::debug!("✏️ Updated box {}", index);
        Ok(())
    }

    /// Change the class of the box at `index`.
    pub fn reassign_class(&mut self, index: usize, class_id: ClassId) -> Result<(), StoreError> {
        let bbox = self.get(index).ok_or_else(|| self.out_of_range(index))?;
        self.update(index, bbox.with_class(class_id))
    }

    /// Remove and return the box at `index`.
    pub fn remove(&mut self, index: usize) -> Result<BoundingBox, StoreError> {
        if index >= self.boxes.len() {
            return Err(self.out_of_range(index));
        }
        let removed = self.boxes.remove(index);
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        self.record();
        log::debug!("🗑️ Removed box {}", index);
        Ok(removed)
    }

    /// Remove all boxes.
    pub fn clear(&mut self) {
        let count = self.boxes.len();
        self.boxes.clear();
        self.selected = None;
        self.record();
        log::debug!("🗑️ Cleared {} boxes", count);
    }

    /// Select a box, or clear the selection with `None`.
    pub fn select(&mut self, index: Option<usize>) -> Result<(), StoreError> {
        if let Some(index) = index {
            if index >= self.boxes.len() {
                return Err(self.out_of_range(index));
            }
        }
        self.selected = index;
        Ok(())
    }

    /// Get the selected box index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// All boxes in insertion order.
    pub fn all(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn get(&self, index: usize) -> Option<BoundingBox> {
        self.boxes.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Find the box under a widget-space point.
    ///
    /// Boxes are tested in insertion order and the first match wins, so
    /// overlapping boxes resolve to the one added earliest.
    pub fn hit_test(&self, widget_point: Point, viewport: &ViewportTransform) -> Option<usize> {
        self.boxes
            .iter()
            .position(|b| viewport.image_rect_to_widget(&b.rect).contains(&widget_point))
    }

    /// Restore the previous snapshot. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.boxes = snapshot.boxes().to_vec();
        self.selected = None;
        true
    }

    /// Restore the next snapshot. Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.boxes = snapshot.boxes().to_vec();
        self.selected = None;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    fn record(&mut self) {
        self.history.push(HistorySnapshot::new(self.boxes.clone()));
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut BoundingBox, StoreError> {
        let len = self.boxes.len();
        self.boxes
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }

    fn out_of_range(&self, index: usize) -> StoreError {
        StoreError::IndexOutOfRange {
            index,
            len: self.boxes.len(),
        }
    }
}
