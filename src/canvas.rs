//! The annotation canvas: viewport, box store and interaction in one place.
//!
//! The application shell drives a [`Canvas`] through a small contract:
//! load an image size, hand over its boxes, feed input events, and read back
//! draw commands and notifications. The canvas never touches files; that is
//! the job of [`DatasetRepository`](crate::dataset::DatasetRepository).

use std::collections::HashMap;

use crate::config::AppConfig;
use crate::constants::FALLBACK_BOX_COLOR;
use crate::event::InputEvent;
use crate::interaction::{CursorIcon, InteractionContext, InteractionStateMachine};
use crate::keybindings::{CanvasAction, KeyBindings};
use crate::message::{ContextAction, Notification};
use crate::model::{BoundingBox, ClassId, Mode, Rect};
use crate::store::{AnnotationStore, StoreError};
use crate::viewport::ViewportTransform;

/// One primitive of the render pass, in widget space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// The image itself.
    Image { rect: Rect },
    /// A committed box.
    Box {
        rect: Rect,
        color: [u8; 3],
        selected: bool,
        class_id: ClassId,
    },
    /// The box being drawn.
    Draft { rect: Rect },
}

/// Annotation canvas for a single image at a time.
#[derive(Debug, Clone)]
pub struct Canvas {
    viewport: ViewportTransform,
    store: AnnotationStore,
    interaction: InteractionStateMachine,
    keybindings: KeyBindings,
    current_class_id: ClassId,
    image_size: Option<(u32, u32)>,
    label_colors: HashMap<ClassId, [u8; 3]>,
    boxes_visible: bool,
    notifications: Vec<Notification>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    /// Create a canvas using the preferences and keybindings of a config.
    pub fn from_config(config: &AppConfig) -> Self {
        let preferences = &config.preferences;
        Self {
            viewport: ViewportTransform::identity().with_zoom_step(preferences.zoom_step),
            store: AnnotationStore::with_history_limit(preferences.history_limit),
            interaction: InteractionStateMachine::new(preferences.default_mode)
                .with_pan_key(config.keybindings.pan_modifier),
            keybindings: config.keybindings.clone(),
            current_class_id: crate::constants::UNASSIGNED_CLASS_ID,
            image_size: None,
            label_colors: HashMap::new(),
            boxes_visible: true,
            notifications: Vec::new(),
        }
    }

    // --- Core contract ---

    /// Show a new image of the given pixel size.
    ///
    /// Resets the viewport, the interaction state, the boxes and their history.
    pub fn load_image(&mut self, width: u32, height: u32) {
        log::info!("Canvas: loaded image {}x{}", width, height);
        self.image_size = Some((width, height));
        self.viewport.reset();
        self.interaction.reset();
        self.store.load(Vec::new());
        self.notifications.push(Notification::BoxCountChanged(0));
    }

    /// Drop the current image. Pointer input is ignored until the next load.
    pub fn unload_image(&mut self) {
        self.image_size = None;
        self.viewport.reset();
        self.interaction.reset();
        self.store.load(Vec::new());
        self.notifications.push(Notification::BoxCountChanged(0));
    }

    /// Replace the boxes of the current image. Not undoable.
    pub fn set_bounding_boxes(&mut self, boxes: Vec<BoundingBox>) {
        self.store.load(boxes);
        self.interaction.resync(&self.store);
        self.notifications
            .push(Notification::BoxCountChanged(self.store.len()));
    }

    /// Class given to newly drawn boxes. Negative means none selected.
    pub fn set_current_class_id(&mut self, class_id: ClassId) {
        log::debug!("Current class id: {}", class_id);
        self.current_class_id = class_id;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.interaction.set_mode(mode);
    }

    /// Colors used to draw boxes per class id.
    pub fn set_label_color_map(&mut self, colors: HashMap<ClassId, [u8; 3]>) {
        self.label_colors = colors;
    }

    /// Undo the last box edit. Returns `false` (and notifies) if there was none.
    pub fn undo(&mut self) -> bool {
        let undone = self.store.undo();
        self.after_history_step(undone, Notification::NothingToUndo);
        undone
    }

    /// Redo the last undone box edit. Returns `false` (and notifies) if there was none.
    pub fn redo(&mut self) -> bool {
        let redone = self.store.redo();
        self.after_history_step(redone, Notification::NothingToRedo);
        redone
    }

    /// Remove all boxes of the current image. Undoable.
    pub fn clear_boxes(&mut self) {
        self.store.clear();
        self.interaction.resync(&self.store);
        self.notifications.push(Notification::BoxCountChanged(0));
    }

    /// Show or hide the boxes. Returns the new visibility.
    pub fn toggle_box_visibility(&mut self) -> bool {
        self.set_boxes_visible(!self.boxes_visible);
        self.boxes_visible
    }

    // --- Events ---

    /// Process one input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if self.image_size.is_none() && event.position().is_some() {
            log::trace!("No image loaded, ignoring {:?}", event);
            return;
        }

        let notifications = self.interaction.handle(
            event,
            InteractionContext {
                viewport: &mut self.viewport,
                store: &mut self.store,
                current_class_id: self.current_class_id,
            },
        );
        self.notifications.extend(notifications);

        if let InputEvent::KeyPressed { key, modifiers } = *event {
            if let Some(action) = self.keybindings.action_for(key, modifiers) {
                self.perform(action);
            }
        }
    }

    /// Apply a context-menu choice to the box that was right-clicked.
    pub fn context_action(&mut self, action: ContextAction) -> Result<(), StoreError> {
        let notifications = self
            .interaction
            .apply_context_action(action, &mut self.store)?;
        self.notifications.extend(notifications);
        Ok(())
    }

    /// Drain the notifications emitted since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // --- View ---

    /// Scale the image to the widget width, vertically centered.
    pub fn fit_to_width(&mut self, widget_width: f64, widget_height: f64) {
        let Some((width, height)) = self.image_size else {
            return;
        };
        self.viewport.fit_to_width(
            widget_width,
            f64::from(width),
            f64::from(height),
            widget_height,
        );
    }

    /// Render the current state as widget-space primitives, back to front.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let Some((width, height)) = self.image_size else {
            return Vec::new();
        };

        let image_rect = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
        let mut commands = vec![DrawCommand::Image {
            rect: self.viewport.image_rect_to_widget(&image_rect),
        }];

        if self.boxes_visible {
            let selected = self.store.selected();
            commands.extend(self.store.all().iter().enumerate().map(|(index, bbox)| {
                DrawCommand::Box {
                    rect: self.viewport.image_rect_to_widget(&bbox.rect),
                    color: self.color_for(bbox.class_id),
                    selected: selected == Some(index),
                    class_id: bbox.class_id,
                }
            }));
        }

        if let Some(draft) = self.interaction.draft_rect() {
            commands.push(DrawCommand::Draft {
                rect: self.viewport.image_rect_to_widget(&draft),
            });
        }

        commands
    }

    pub fn cursor(&self) -> CursorIcon {
        self.interaction.cursor()
    }

    // --- Accessors ---

    pub fn bounding_boxes(&self) -> &[BoundingBox] {
        self.store.all()
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn interaction(&self) -> &InteractionStateMachine {
        &self.interaction
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode()
    }

    pub fn current_class_id(&self) -> ClassId {
        self.current_class_id
    }

    pub fn boxes_visible(&self) -> bool {
        self.boxes_visible
    }

    pub fn set_boxes_visible(&mut self, visible: bool) {
        if self.boxes_visible != visible {
            log::debug!("Box visibility: {}", visible);
        }
        self.boxes_visible = visible;
    }

    fn color_for(&self, class_id: ClassId) -> [u8; 3] {
        self.label_colors
            .get(&class_id)
            .copied()
            .unwrap_or(FALLBACK_BOX_COLOR)
    }

    fn after_history_step(&mut self, changed: bool, nothing: Notification) {
        if changed {
            self.interaction.resync(&self.store);
            self.notifications
                .push(Notification::BoxCountChanged(self.store.len()));
        } else {
            self.notifications.push(nothing);
        }
    }

    fn perform(&mut self, action: CanvasAction) {
        log::debug!("Key action: {:?}", action);
        match action {
            CanvasAction::Undo => {
                self.undo();
            }
            CanvasAction::Redo => {
                self.redo();
            }
            CanvasAction::DeleteSelected => {
                let Some(index) = self.store.selected() else {
                    return;
                };
                match self.store.remove(index) {
                    Ok(_) => {
                        self.interaction.resync(&self.store);
                        self.notifications
                            .push(Notification::BoxCountChanged(self.store.len()));
                    }
                    Err(e) => log::warn!("Failed to delete selected box: {}", e),
                }
            }
            CanvasAction::SetMode(mode) => self.set_mode(mode),
            CanvasAction::Cancel => {
                self.interaction.cancel_context();
                if self.store.select(None).is_ok() {
                    self.interaction.resync(&self.store);
                }
            }
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Key, Modifiers, MouseButton};
    use crate::model::Point;

    fn press(button: MouseButton, x: f64, y: f64) -> InputEvent {
        InputEvent::PointerPressed {
            button,
            position: Point::new(x, y),
        }
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMoved {
            position: Point::new(x, y),
        }
    }

    fn release(button: MouseButton, x: f64, y: f64) -> InputEvent {
        InputEvent::PointerReleased {
            button,
            position: Point::new(x, y),
        }
    }

    fn key(key: Key, modifiers: Modifiers) -> InputEvent {
        InputEvent::KeyPressed { key, modifiers }
    }

    fn draw(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
        canvas.handle_event(&press(MouseButton::Left, from.0, from.1));
        canvas.handle_event(&moved(to.0, to.1));
        canvas.handle_event(&release(MouseButton::Left, to.0, to.1));
    }

    fn annotating_canvas() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.load_image(1000, 500);
        canvas.set_mode(Mode::Annotate);
        canvas.set_current_class_id(2);
        canvas.take_notifications();
        canvas
    }

    #[test]
    fn test_draw_scenario() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (100.0, 100.0), (300.0, 200.0));

        assert_eq!(
            canvas.bounding_boxes(),
            &[BoundingBox::new(2, Rect::new(100.0, 100.0, 200.0, 100.0))]
        );
        assert_eq!(
            canvas.take_notifications(),
            vec![
                Notification::BoxAdded { index: 0 },
                Notification::BoxCountChanged(1)
            ]
        );
        assert!(canvas.take_notifications().is_empty());
    }

    #[test]
    fn test_pointer_ignored_without_image() {
        let mut canvas = Canvas::new();
        canvas.set_mode(Mode::Annotate);
        canvas.set_current_class_id(0);
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));

        assert!(canvas.bounding_boxes().is_empty());
        assert!(canvas.draw_commands().is_empty());
    }

    #[test]
    fn test_load_image_resets_view_and_history() {
        let mut canvas = annotating_canvas();
        canvas.handle_event(&InputEvent::Wheel {
            delta: 1.0,
            position: Point::new(10.0, 10.0),
        });
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));

        canvas.load_image(640, 480);
        assert_eq!(canvas.viewport().zoom(), 1.0);
        assert!(canvas.bounding_boxes().is_empty());
        assert!(!canvas.undo());
        assert_eq!(canvas.mode(), Mode::Annotate);
    }

    #[test]
    fn test_image_change_reports_empty_canvas() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        canvas.take_notifications();

        canvas.load_image(50, 50);
        assert!(canvas.bounding_boxes().is_empty());
        assert_eq!(canvas.take_notifications(), vec![Notification::BoxCountChanged(0)]);

        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        canvas.take_notifications();
        canvas.unload_image();
        assert_eq!(canvas.take_notifications(), vec![Notification::BoxCountChanged(0)]);
    }

    #[test]
    fn test_set_bounding_boxes_is_not_undoable() {
        let mut canvas = annotating_canvas();
        canvas.set_bounding_boxes(vec![BoundingBox::new(
            1,
            Rect::new(0.0, 0.0, 5.0, 5.0),
        )]);
        canvas.take_notifications();

        assert!(!canvas.undo());
        assert_eq!(canvas.take_notifications(), vec![Notification::NothingToUndo]);
        assert_eq!(canvas.bounding_boxes().len(), 1);
    }

    #[test]
    fn test_undo_redo_notifications() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        canvas.take_notifications();

        assert!(canvas.undo());
        assert_eq!(canvas.take_notifications(), vec![Notification::BoxCountChanged(0)]);
        assert!(canvas.redo());
        assert!(!canvas.redo());
        assert_eq!(
            canvas.take_notifications(),
            vec![
                Notification::BoxCountChanged(1),
                Notification::NothingToRedo
            ]
        );
    }

    #[test]
    fn test_keyboard_undo_and_mode_switch() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        canvas.handle_event(&key(Key::Char('z'), Modifiers::CTRL));
        assert!(canvas.bounding_boxes().is_empty());

        canvas.handle_event(&key(Key::Char('y'), Modifiers::CTRL));
        assert_eq!(canvas.bounding_boxes().len(), 1);

        canvas.handle_event(&key(Key::Char('s'), Modifiers::default()));
        assert_eq!(canvas.mode(), Mode::Select);
    }

    #[test]
    fn test_delete_selected_with_key() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        draw(&mut canvas, (50.0, 50.0), (60.0, 60.0));
        canvas.set_mode(Mode::Select);

        canvas.handle_event(&press(MouseButton::Left, 55.0, 55.0));
        canvas.handle_event(&release(MouseButton::Left, 55.0, 55.0));
        assert_eq!(canvas.store().selected(), Some(1));

        canvas.handle_event(&key(Key::Delete, Modifiers::default()));
        assert_eq!(canvas.bounding_boxes().len(), 1);
        assert_eq!(canvas.store().selected(), None);
    }

    #[test]
    fn test_context_menu_flow() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        canvas.set_mode(Mode::Select);
        canvas.take_notifications();

        canvas.handle_event(&press(MouseButton::Right, 5.0, 5.0));
        assert!(matches!(
            canvas.take_notifications().as_slice(),
            [Notification::ContextMenuRequested { index: 0, .. }]
        ));

        canvas.context_action(ContextAction::ReassignClass(4)).unwrap();
        assert_eq!(canvas.bounding_boxes()[0].class_id, 4);
    }

    #[test]
    fn test_clear_boxes_is_undoable() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));
        canvas.clear_boxes();
        assert!(canvas.bounding_boxes().is_empty());

        assert!(canvas.undo());
        assert_eq!(canvas.bounding_boxes().len(), 1);
    }

    #[test]
    fn test_draw_commands() {
        let mut canvas = annotating_canvas();
        canvas.set_label_color_map(HashMap::from([(2, [0, 200, 100])]));
        canvas.set_bounding_boxes(vec![
            BoundingBox::new(2, Rect::new(10.0, 10.0, 20.0, 20.0)),
            BoundingBox::new(9, Rect::new(40.0, 40.0, 10.0, 10.0)),
        ]);
        canvas.fit_to_width(500.0, 400.0);

        let commands = canvas.draw_commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            DrawCommand::Image {
                rect: Rect::new(0.0, 75.0, 500.0, 250.0)
            }
        );
        assert_eq!(
            commands[1],
            DrawCommand::Box {
                rect: Rect::new(5.0, 80.0, 10.0, 10.0),
                color: [0, 200, 100],
                selected: false,
                class_id: 2,
            }
        );
        assert!(matches!(
            commands[2],
            DrawCommand::Box {
                color: FALLBACK_BOX_COLOR,
                ..
            }
        ));

        canvas.handle_event(&press(MouseButton::Left, 100.0, 100.0));
        canvas.handle_event(&moved(120.0, 110.0));
        assert!(matches!(
            canvas.draw_commands().last(),
            Some(DrawCommand::Draft { .. })
        ));
    }

    #[test]
    fn test_toggle_visibility_hides_boxes() {
        let mut canvas = annotating_canvas();
        draw(&mut canvas, (0.0, 0.0), (10.0, 10.0));

        assert!(!canvas.toggle_box_visibility());
        assert_eq!(canvas.draw_commands().len(), 1);
        assert_eq!(canvas.bounding_boxes().len(), 1);
        assert!(canvas.toggle_box_visibility());
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.preferences.default_mode = Mode::Annotate;
        config.preferences.history_limit = 3;

        let mut canvas = Canvas::from_config(&config);
        canvas.load_image(100, 100);
        canvas.set_current_class_id(0);
        for i in 0..5 {
            let x = f64::from(i) * 10.0;
            draw(&mut canvas, (x, 0.0), (x + 5.0, 5.0));
        }

        assert_eq!(canvas.mode(), Mode::Annotate);
        assert!(canvas.undo());
        assert!(canvas.undo());
        assert!(!canvas.undo());
        assert_eq!(canvas.bounding_boxes().len(), 3);
    }
}
