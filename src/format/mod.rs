//! Label file formats.
//!
//! Boxes are persisted per image as a YOLO text file next to the image:
//! one `class cx cy w h` line per box, coordinates normalized to `[0, 1]`
//! by the image's pixel size.
//!
//! ```rust,ignore
//! use annobox::format::LabelSerializer;
//!
//! let serializer = LabelSerializer::new(1000, 500)?;
//! let content = serializer.format_label_file(canvas.bounding_boxes());
//! let boxes = serializer.parse_label_file(&content)?;
//! ```

mod error;
mod yolo;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use yolo::LabelSerializer;
