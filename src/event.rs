//! Normalized input events fed to the canvas.
//!
//! The windowing layer translates its native events into these before
//! handing them over. Positions are in widget space.

use serde::{Deserialize, Serialize};

use crate::model::Point;

/// Events the canvas responds to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer button pressed.
    PointerPressed { button: MouseButton, position: Point },
    /// Pointer button released.
    PointerReleased { button: MouseButton, position: Point },
    /// Pointer moved.
    PointerMoved { position: Point },
    /// Mouse wheel scrolled. Positive delta zooms in.
    Wheel { delta: f64, position: Point },
    /// Keyboard key pressed.
    KeyPressed { key: Key, modifiers: Modifiers },
    /// Keyboard key released.
    KeyReleased { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    /// Widget-space position carried by pointer events.
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerPressed { position, .. }
            | InputEvent::PointerReleased { position, .. }
            | InputEvent::PointerMoved { position }
            | InputEvent::Wheel { position, .. } => Some(*position),
            InputEvent::KeyPressed { .. } | InputEvent::KeyReleased { .. } => None,
        }
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard keys (the subset the canvas binds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Only Ctrl held.
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// No modifier held.
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}
