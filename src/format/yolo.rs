//! YOLO TXT label serialization.
//!
//! Each line is `class cx cy w h`: the class id followed by the box center
//! and size, normalized by the image width/height and written with six
//! decimals.

use crate::format::error::FormatError;
use crate::model::{BoundingBox, ClassId, Rect};

/// Converts boxes of one image to and from normalized label lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSerializer {
    width: f64,
    height: f64,
}

impl LabelSerializer {
    /// Create a serializer for an image of `width` x `height` pixels.
    ///
    /// Fails with [`FormatError::MissingDimensions`] if either is 0.
    pub fn new(width: u32, height: u32) -> Result<Self, FormatError> {
        if width == 0 || height == 0 {
            return Err(FormatError::MissingDimensions { width, height });
        }
        Ok(Self {
            width: f64::from(width),
            height: f64::from(height),
        })
    }

    /// Format one box as a label line (no trailing newline).
    ///
    /// Boxes with non-positive width or height yield `None` and are skipped.
    pub fn to_normalized(&self, bbox: &BoundingBox) -> Option<String> {
        let rect = &bbox.rect;
        if rect.is_degenerate() {
            return None;
        }

        let cx = (rect.x + rect.width / 2.0) / self.width;
        let cy = (rect.y + rect.height / 2.0) / self.height;
        let nw = rect.width / self.width;
        let nh = rect.height / self.height;

        Some(format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            bbox.class_id, cx, cy, nw, nh
        ))
    }

    /// Parse a single label line back into a pixel-space box.
    pub fn from_normalized(&self, line: &str) -> Result<BoundingBox, FormatError> {
        self.parse_line(1, line)
    }

    /// Parse the whole content of a label file.
    ///
    /// Blank lines are ignored. The first malformed line aborts the load;
    /// no partial result is returned.
    pub fn parse_label_file(&self, content: &str) -> Result<Vec<BoundingBox>, FormatError> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| self.parse_line(index + 1, line))
            .collect()
    }

    /// Format all eligible boxes, one `\n`-terminated line each.
    pub fn format_label_file(&self, boxes: &[BoundingBox]) -> String {
        boxes
            .iter()
            .filter_map(|bbox| self.to_normalized(bbox))
            .map(|line| line + "\n")
            .collect()
    }

    /// Number of boxes [`format_label_file`](Self::format_label_file) would write.
    pub fn eligible_count(boxes: &[BoundingBox]) -> usize {
        boxes.iter().filter(|b| !b.rect.is_degenerate()).count()
    }

    fn parse_line(&self, line_no: usize, line: &str) -> Result<BoundingBox, FormatError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return Err(FormatError::parse(
                line_no,
                format!("expected 5 fields, found {}", parts.len()),
            ));
        }

        let class_id: ClassId = parts[0]
            .parse()
            .map_err(|_| FormatError::invalid_number(line_no, "class id", parts[0]))?;
        let cx = parse_coord(line_no, "center x", parts[1])?;
        let cy = parse_coord(line_no, "center y", parts[2])?;
        let nw = parse_coord(line_no, "width", parts[3])?;
        let nh = parse_coord(line_no, "height", parts[4])?;

        if nw < 0.0 || nh < 0.0 {
            return Err(FormatError::parse(line_no, "negative box size"));
        }

        let rect = Rect::new(
            (cx - nw / 2.0) * self.width,
            (cy - nh / 2.0) * self.height,
            nw * self.width,
            nh * self.height,
        );
        Ok(BoundingBox::new(class_id, rect))
    }
}

fn parse_coord(line_no: usize, field: &'static str, token: &str) -> Result<f64, FormatError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormatError::invalid_number(line_no, field, token))
}
