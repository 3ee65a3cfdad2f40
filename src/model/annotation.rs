//! Annotation geometry, bounding boxes and editing modes.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::constants::UNASSIGNED_CLASS_ID;

/// Class id attached to every bounding box (`-1` = unassigned).
pub type ClassId = i32;

/// Negative ids (`-1` by convention) mean no class is selected.
pub fn is_assigned_class(class_id: ClassId) -> bool {
    class_id > UNASSIGNED_CLASS_ID
}

/// A 2D point, in either image or widget coordinates depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Offsets such as the viewport pan share the point representation.
pub type Vector2 = Point;

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner X coordinate
    pub x: f64,
    /// Top-left corner Y coordinate
    pub y: f64,
    /// Width of the rectangle
    pub width: f64,
    /// Height of the rectangle
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized rectangle from two opposite corners.
    ///
    /// Corners are swapped as needed so width and height are never negative.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point lies inside the rectangle (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// A rectangle with non-positive width or height has no area to annotate.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Get the top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A labelled rectangle in image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Class id from the label catalogue.
    pub class_id: ClassId,
    /// Geometry in original image pixels.
    pub rect: Rect,
}

impl BoundingBox {
    pub fn new(class_id: ClassId, rect: Rect) -> Self {
        Self { class_id, rect }
    }

    /// Whether a class has been assigned to this box.
    pub fn is_assigned(&self) -> bool {
        is_assigned_class(self.class_id)
    }

    /// Same geometry, different class.
    pub fn with_class(mut self, class_id: ClassId) -> Self {
        self.class_id = class_id;
        self
    }
}

/// Top-level behavior selector of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Click boxes to select, reassign or delete them
    #[default]
    Select,
    /// Drag to draw new boxes
    Annotate,
}

impl Mode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Select => "Select",
            Mode::Annotate => "Annotate",
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [Mode] {
        &[Mode::Select, Mode::Annotate]
    }

    /// Check if pointer drags in this mode draw boxes.
    pub fn is_drawing_mode(&self) -> bool {
        matches!(self, Mode::Annotate)
    }
}
