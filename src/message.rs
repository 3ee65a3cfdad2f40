//! Messages exchanged between the canvas and the application shell.

use crate::model::{ClassId, Point};

/// Notifications the canvas emits for the surrounding application.
///
/// The shell drains them with `Canvas::take_notifications` after each event.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A box was drawn while no class was selected; nothing was created.
    LabelNeeded,
    /// A drawn box was committed at the given index (the image now has unsaved edits).
    BoxAdded { index: usize },
    /// The number of boxes on the canvas changed.
    BoxCountChanged(usize),
    /// A box was right-clicked in select mode; reassign/delete are now available.
    ContextMenuRequested { index: usize, position: Point },
    /// Undo was requested with an empty undo history.
    NothingToUndo,
    /// Redo was requested with an empty redo history.
    NothingToRedo,
}

/// Operations offered for the box targeted by a context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    /// Give the box a different class
    ReassignClass(ClassId),
    /// Delete the box
    Delete,
}
