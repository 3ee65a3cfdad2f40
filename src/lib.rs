//! annobox - bounding box annotation engine
//!
//! The core is the [`canvas::Canvas`]: a zoomable, pannable view of one image
//! on which boxes are drawn, selected, relabelled and deleted with undo/redo.
//! Boxes are persisted per image as normalized YOLO label files by the
//! [`dataset`] layer.

pub mod canvas;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod event;
pub mod format;
pub mod history;
pub mod interaction;
pub mod keybindings;
pub mod message;
pub mod model;
pub mod store;
pub mod viewport;
