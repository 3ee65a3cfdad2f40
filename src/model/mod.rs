//! Data models for the annotation engine.

mod annotation;
mod category;

pub use annotation::{BoundingBox, ClassId, Mode, Point, Rect, Vector2, is_assigned_class};
pub use category::Category;
