//! Label category data model.

use crate::color_utils;
use crate::model::ClassId;

/// A label category with a name and color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Class id written to label files
    pub id: ClassId,
    /// Display name of the category
    pub name: String,
    /// RGB color for the category
    pub color: [u8; 3],
}

impl Category {
    /// Create a new category with the given ID, name, and color.
    pub fn new(id: ClassId, name: &str, color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
        }
    }

    /// Color as a `#RRGGBB` string.
    pub fn hex_color(&self) -> String {
        color_utils::to_hex(self.color)
    }
}
