//! Customizable keybindings for the canvas.
//!
//! Keys are stored as [`Key`] plus a set of required modifiers so the
//! bindings can round-trip through the JSON config file.

use serde::{Deserialize, Serialize};

use crate::event::{Key, Modifiers};
use crate::model::Mode;

/// A key together with whether Ctrl must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    #[serde(default)]
    pub ctrl: bool,
}

impl KeyChord {
    pub const fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub const fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }

    /// Check if a key press triggers this chord. Character keys match case-insensitively.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        if self.ctrl != (modifiers.ctrl || modifiers.meta) {
            return false;
        }
        match (self.key, key) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

/// Canvas operations reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasAction {
    Undo,
    Redo,
    DeleteSelected,
    SetMode(Mode),
    /// Close the context menu / drop the selection.
    Cancel,
}

/// Keybinding configuration for the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Held to turn left-drags into pans
    pub pan_modifier: Key,
    pub undo: KeyChord,
    pub redo: KeyChord,
    /// Deletes the selected box
    pub delete: KeyChord,
    /// Switches to select mode
    pub mode_select: KeyChord,
    /// Switches to annotate mode
    pub mode_annotate: KeyChord,
    pub cancel: KeyChord,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pan_modifier: Key::Space,
            undo: KeyChord::ctrl(Key::Char('z')),
            redo: KeyChord::ctrl(Key::Char('y')),
            delete: KeyChord::plain(Key::Delete),
            mode_select: KeyChord::plain(Key::Char('s')),
            mode_annotate: KeyChord::plain(Key::Char('a')),
            cancel: KeyChord::plain(Key::Escape),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<CanvasAction> {
        if self.undo.matches(key, modifiers) {
            Some(CanvasAction::Undo)
        } else if self.redo.matches(key, modifiers) {
            Some(CanvasAction::Redo)
        } else if self.delete.matches(key, modifiers) {
            Some(CanvasAction::DeleteSelected)
        } else if self.mode_select.matches(key, modifiers) {
            Some(CanvasAction::SetMode(Mode::Select))
        } else if self.mode_annotate.matches(key, modifiers) {
            Some(CanvasAction::SetMode(Mode::Annotate))
        } else if self.cancel.matches(key, modifiers) {
            Some(CanvasAction::Cancel)
        } else {
            None
        }
    }

    /// Check if a chord is already used by any binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, chord: KeyChord) -> Option<&'static str> {
        let bindings = [
            (self.undo, "Undo"),
            (self.redo, "Redo"),
            (self.delete, "Delete box"),
            (self.mode_select, "Select mode"),
            (self.mode_annotate, "Annotate mode"),
            (self.cancel, "Cancel"),
        ];
        if chord.key == self.pan_modifier && !chord.ctrl {
            return Some("Pan modifier");
        }
        bindings
            .iter()
            .find(|(bound, _)| *bound == chord)
            .map(|(_, name)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_actions() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.action_for(Key::Char('z'), Modifiers::CTRL),
            Some(CanvasAction::Undo)
        );
        assert_eq!(
            bindings.action_for(Key::Char('Y'), Modifiers::CTRL),
            Some(CanvasAction::Redo)
        );
        assert_eq!(
            bindings.action_for(Key::Delete, Modifiers::default()),
            Some(CanvasAction::DeleteSelected)
        );
        assert_eq!(
            bindings.action_for(Key::Char('a'), Modifiers::default()),
            Some(CanvasAction::SetMode(Mode::Annotate))
        );
        assert_eq!(
            bindings.action_for(Key::Escape, Modifiers::default()),
            Some(CanvasAction::Cancel)
        );
    }

    #[test]
    fn test_modifier_must_match() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for(Key::Char('z'), Modifiers::default()), None);
        assert_eq!(bindings.action_for(Key::Char('s'), Modifiers::CTRL), None);
        assert_eq!(bindings.action_for(Key::Space, Modifiers::default()), None);
    }

    #[test]
    fn test_key_conflict() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.key_conflict(KeyChord::plain(Key::Char('s'))),
            Some("Select mode")
        );
        assert_eq!(
            bindings.key_conflict(KeyChord::plain(Key::Space)),
            Some("Pan modifier")
        );
        assert_eq!(bindings.key_conflict(KeyChord::plain(Key::Char('q'))), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let bindings = KeyBindings {
            undo: KeyChord::ctrl(Key::Char('u')),
            ..KeyBindings::default()
        };
        let json = serde_json::to_string(&bindings).unwrap();
        let back: KeyBindings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bindings);
    }
}
