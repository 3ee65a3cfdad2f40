//! Pointer/keyboard state machine of the canvas.
//!
//! Turns normalized [`InputEvent`]s into drawing, panning and selection,
//! mutating the viewport and the annotation store it is handed.
//!
//! | state         | trigger                                   | next          |
//! |---------------|-------------------------------------------|---------------|
//! | any idle      | middle down, or left down with pan key    | `Panning`     |
//! | any idle      | left down in annotate mode                | `Drawing`     |
//! | any idle      | left/right down on a box in select mode   | `BoxSelected` |
//! | `Panning`     | release of the button that started it     | idle          |
//! | `Drawing`     | left up (commits the box)                 | `Idle`        |
//!
//! Presses arriving while a pan or a draw is in progress are ignored.

use crate::event::{InputEvent, Key, MouseButton};
use crate::message::{ContextAction, Notification};
use crate::model::{BoundingBox, ClassId, Mode, Point, Rect, is_assigned_class};
use crate::store::{AnnotationStore, StoreError};
use crate::viewport::{ViewportTransform, ZoomDirection};

/// The active interaction. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    /// Nothing in progress and nothing selected.
    Idle,
    /// Dragging the view. `anchor` is the last pointer position in widget space.
    Panning { anchor: Point, button: MouseButton },
    /// Drawing a box. Both fields are in image space.
    Drawing { start: Point, rect: Rect },
    /// A box is selected.
    BoxSelected { index: usize },
}

impl InteractionState {
    /// Check if a pointer gesture (pan or draw) is in progress.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            InteractionState::Panning { .. } | InteractionState::Drawing { .. }
        )
    }
}

/// Pointer cursor the shell should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorIcon {
    Default,
    Crosshair,
    Pointer,
    Grab,
    Grabbing,
}

/// Cursor feedback for a state. Has no effect on data.
pub fn cursor_for(state: &InteractionState, mode: Mode, pan_key_held: bool) -> CursorIcon {
    match state {
        InteractionState::Panning { .. } => CursorIcon::Grabbing,
        _ if pan_key_held => CursorIcon::Grab,
        InteractionState::Drawing { .. } => CursorIcon::Crosshair,
        _ if mode.is_drawing_mode() => CursorIcon::Crosshair,
        InteractionState::BoxSelected { .. } => CursorIcon::Pointer,
        InteractionState::Idle => CursorIcon::Default,
    }
}

/// What an event may touch.
pub struct InteractionContext<'a> {
    pub viewport: &'a mut ViewportTransform,
    pub store: &'a mut AnnotationStore,
    /// Class given to newly drawn boxes (negative = none selected).
    pub current_class_id: ClassId,
}

/// Drives drawing, panning and selection from input events.
#[derive(Debug, Clone)]
pub struct InteractionStateMachine {
    state: InteractionState,
    mode: Mode,
    pan_key: Key,
    pan_key_held: bool,
    context_target: Option<usize>,
}

impl InteractionStateMachine {
    pub fn new(mode: Mode) -> Self {
        Self {
            state: InteractionState::Idle,
            mode,
            pan_key: Key::Space,
            pan_key_held: false,
            context_target: None,
        }
    }

    /// Use a different key as the pan modifier.
    pub fn with_pan_key(mut self, key: Key) -> Self {
        self.pan_key = key;
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_pan_key_held(&self) -> bool {
        self.pan_key_held
    }

    /// Box targeted by the open context menu, if any.
    pub fn context_target(&self) -> Option<usize> {
        self.context_target
    }

    /// The box being drawn, in image space.
    pub fn draft_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::Drawing { rect, .. } => Some(rect),
            _ => None,
        }
    }

    /// Cursor for the current state.
    pub fn cursor(&self) -> CursorIcon {
        cursor_for(&self.state, self.mode, self.pan_key_held)
    }

    /// Switch mode. Any gesture in progress is dropped.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("🔄 Mode: {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
        self.reset();
    }

    /// Back to `Idle`. Done on every image change.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.context_target = None;
    }

    /// Re-derive the resting state after the store changed underneath
    /// (undo, redo, clear, external replace). Gestures in progress are kept.
    pub fn resync(&mut self, store: &AnnotationStore) {
        if !self.state.is_gesture() {
            self.state = rest_state(store);
        }
        if self.context_target.is_some() && self.context_target != store.selected() {
            self.context_target = None;
        }
    }

    /// Close the context menu without acting on it.
    pub fn cancel_context(&mut self) {
        self.context_target = None;
    }

    /// Process one event to completion.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        ctx: InteractionContext<'_>,
    ) -> Vec<Notification> {
        let mut notifications = Vec::new();
        match *event {
            InputEvent::PointerPressed { button, position } => {
                self.pointer_pressed(button, position, ctx, &mut notifications);
            }
            InputEvent::PointerMoved { position } => self.pointer_moved(position, ctx),
            InputEvent::PointerReleased { button, position } => {
                self.pointer_released(button, position, ctx, &mut notifications);
            }
            InputEvent::Wheel { delta, position } => self.wheel(delta, position, ctx),
            InputEvent::KeyPressed { key, .. } => {
                if key == self.pan_key {
                    self.pan_key_held = true;
                }
            }
            InputEvent::KeyReleased { key, .. } => {
                if key == self.pan_key {
                    self.pan_key_held = false;
                }
            }
        }
        notifications
    }

    /// Apply a context-menu operation to the targeted box.
    pub fn apply_context_action(
        &mut self,
        action: ContextAction,
        store: &mut AnnotationStore,
    ) -> Result<Vec<Notification>, StoreError> {
        let Some(index) = self.context_target else {
            log::warn!("Context action {:?} without a target box", action);
            return Ok(Vec::new());
        };

        let notifications = match action {
            ContextAction::ReassignClass(class_id) => {
                store.reassign_class(index, class_id)?;
                log::debug!("Box {} reassigned to class {}", index, class_id);
                Vec::new()
            }
            ContextAction::Delete => {
                store.remove(index)?;
                vec![Notification::BoxCountChanged(store.len())]
            }
        };

        self.context_target = None;
        self.state = rest_state(store);
        Ok(notifications)
    }

    fn pointer_pressed(
        &mut self,
        button: MouseButton,
        position: Point,
        ctx: InteractionContext<'_>,
        notifications: &mut Vec<Notification>,
    ) {
        if self.state.is_gesture() {
            log::trace!("Ignoring {:?} press during {:?}", button, self.state);
            return;
        }

        match button {
            MouseButton::Middle => self.start_pan(button, position),
            MouseButton::Left if self.pan_key_held => self.start_pan(button, position),
            MouseButton::Left => {
                self.context_target = None;
                match self.mode {
                    Mode::Annotate => {
                        // Selection is irrelevant while drawing; index is always valid for None.
                        let _ = ctx.store.select(None);
                        let start = ctx.viewport.widget_to_image(position);
                        self.state = InteractionState::Drawing {
                            start,
                            rect: Rect::new(start.x, start.y, 0.0, 0.0),
                        };
                        log::debug!("✏️ Drawing started at ({:.1}, {:.1})", start.x, start.y);
                    }
                    Mode::Select => self.select_at(position, ctx),
                }
            }
            MouseButton::Right if self.mode == Mode::Select => {
                self.select_at(position, ctx);
                if let InteractionState::BoxSelected { index } = self.state {
                    self.context_target = Some(index);
                    notifications.push(Notification::ContextMenuRequested { index, position });
                }
            }
            MouseButton::Right | MouseButton::Other(_) => {}
        }
    }

    fn pointer_moved(&mut self, position: Point, ctx: InteractionContext<'_>) {
        match &mut self.state {
            InteractionState::Panning { anchor, .. } => {
                let delta = position - *anchor;
                ctx.viewport.pan_by(delta);
                *anchor = position;
            }
            InteractionState::Drawing { start, rect } => {
                let corner = ctx.viewport.widget_to_image(position);
                *rect = Rect::from_corners(*start, corner);
            }
            InteractionState::Idle | InteractionState::BoxSelected { .. } => {}
        }
    }

    fn pointer_released(
        &mut self,
        button: MouseButton,
        position: Point,
        ctx: InteractionContext<'_>,
        notifications: &mut Vec<Notification>,
    ) {
        match self.state {
            InteractionState::Panning {
                button: pan_button, ..
            } if pan_button == button => {
                log::debug!(
                    "🖐️ Pan ended at ({:.1}, {:.1})",
                    ctx.viewport.pan().x,
                    ctx.viewport.pan().y
                );
                self.state = rest_state(ctx.store);
            }
            InteractionState::Drawing { start, .. } if button == MouseButton::Left => {
                let corner = ctx.viewport.widget_to_image(position);
                let rect = Rect::from_corners(start, corner);
                self.state = InteractionState::Idle;
                self.commit(rect, ctx, notifications);
            }
            _ => {}
        }
    }

    fn wheel(&mut self, delta: f64, position: Point, ctx: InteractionContext<'_>) {
        if matches!(self.state, InteractionState::Drawing { .. }) {
            log::trace!("Zoom suppressed while drawing");
            return;
        }
        if let Some(direction) = ZoomDirection::from_wheel_delta(delta) {
            ctx.viewport.zoom_at(position, direction);
        }
    }

    fn start_pan(&mut self, button: MouseButton, position: Point) {
        log::debug!(
            "Pan started with {:?} at ({:.1}, {:.1})",
            button,
            position.x,
            position.y
        );
        self.state = InteractionState::Panning {
            anchor: position,
            button,
        };
    }

    fn select_at(&mut self, position: Point, ctx: InteractionContext<'_>) {
        let hit = ctx.store.hit_test(position, ctx.viewport);
        // hit_test only returns indices inside the store.
        let _ = ctx.store.select(hit);
        self.state = match hit {
            Some(index) => {
                log::debug!("Selected box {}", index);
                InteractionState::BoxSelected { index }
            }
            None => InteractionState::Idle,
        };
    }

    fn commit(
        &mut self,
        rect: Rect,
        ctx: InteractionContext<'_>,
        notifications: &mut Vec<Notification>,
    ) {
        if !is_assigned_class(ctx.current_class_id) {
            log::info!("Box discarded: select a label before annotating");
            notifications.push(Notification::LabelNeeded);
            return;
        }
        if rect.is_degenerate() {
            log::debug!("Box discarded: zero-size draft");
            return;
        }

        let index = ctx
            .store
            .add(BoundingBox::new(ctx.current_class_id, rect));
        notifications.push(Notification::BoxAdded { index });
        notifications.push(Notification::BoxCountChanged(ctx.store.len()));
    }
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

fn rest_state(store: &AnnotationStore) -> InteractionState {
    match store.selected() {
        Some(index) => InteractionState::BoxSelected { index },
        None => InteractionState::Idle,
    }
}
