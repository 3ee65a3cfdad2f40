//! Zoom/pan mapping between widget space and image space.
//!
//! A widget point `w` and an image point `i` are related by
//! `w = i * zoom + pan`, with `pan` measured in widget pixels.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::model::{Point, Rect, Vector2};

/// Direction of a single zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Map a wheel delta to a zoom direction. A zero delta requests nothing.
    pub fn from_wheel_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(ZoomDirection::In)
        } else if delta < 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

/// Pan/zoom state of one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    zoom: f64,
    pan: Vector2,
    zoom_step: f64,
}

impl ViewportTransform {
    /// Create a transform with the given zoom and pan. Zoom is clamped to the allowed range.
    pub fn new(zoom: f64, pan: Vector2) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan,
            zoom_step: ZOOM_STEP,
        }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, Point::ORIGIN)
    }

    /// Use a different multiplier per zoom step. Values `<= 1.0` keep the default.
    pub fn with_zoom_step(mut self, zoom_step: f64) -> Self {
        if zoom_step > 1.0 {
            self.zoom_step = zoom_step;
        } else {
            log::warn!("Ignoring zoom step {zoom_step}, keeping {}", self.zoom_step);
        }
        self
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vector2 {
        self.pan
    }

    pub fn zoom_step(&self) -> f64 {
        self.zoom_step
    }

    /// Back to zoom 1.0 and no pan. Done on every image load.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ORIGIN;
    }

    /// Map an image-space point to widget space.
    pub fn image_to_widget(&self, p: Point) -> Point {
        p * self.zoom + self.pan
    }

    /// Map a widget-space point to image space.
    ///
    /// Returns the origin if zoom is exactly 0.
    pub fn widget_to_image(&self, p: Point) -> Point {
        if self.zoom == 0.0 {
            return Point::ORIGIN;
        }
        (p - self.pan) / self.zoom
    }

    /// Map an image-space rectangle to widget space.
    pub fn image_rect_to_widget(&self, rect: &Rect) -> Rect {
        let top_left = self.image_to_widget(rect.top_left());
        Rect::new(
            top_left.x,
            top_left.y,
            rect.width * self.zoom,
            rect.height * self.zoom,
        )
    }

    /// Zoom one step around `widget_point`.
    ///
    /// The image point under `widget_point` stays under it. Returns `false`
    /// (and leaves pan untouched) when the zoom is already at the limit.
    pub fn zoom_at(&mut self, widget_point: Point, direction: ZoomDirection) -> bool {
        let old_zoom = self.zoom;
        let new_zoom = match direction {
            ZoomDirection::In => old_zoom * self.zoom_step,
            ZoomDirection::Out => old_zoom / self.zoom_step,
        }
        .clamp(MIN_ZOOM, MAX_ZOOM);

        if new_zoom == old_zoom {
            log::trace!("Zoom already at limit {:.2}x", old_zoom);
            return false;
        }

        let ratio = new_zoom / old_zoom;
        self.pan = self.pan + (widget_point - self.pan) * (1.0 - ratio);
        self.zoom = new_zoom;

        log::debug!(
            "🔍 Zoom-to-cursor: {:.2}x at ({:.1}, {:.1}), pan: ({:.1}, {:.1})",
            self.zoom,
            widget_point.x,
            widget_point.y,
            self.pan.x,
            self.pan.y
        );
        true
    }

    /// Apply a pan delta in widget pixels.
    pub fn pan_by(&mut self, delta: Vector2) {
        self.pan += delta;
    }

    /// Scale the image to the viewport width, flush left and vertically centered.
    pub fn fit_to_width(
        &mut self,
        viewport_width: f64,
        image_width: f64,
        image_height: f64,
        widget_height: f64,
    ) {
        self.zoom = if image_width == 0.0 {
            1.0
        } else {
            (viewport_width / image_width).clamp(MIN_ZOOM, MAX_ZOOM)
        };
        self.pan = Point::new(0.0, (widget_height - image_height * self.zoom) / 2.0);
        log::debug!(
            "Fit to width: {:.3}x, pan ({:.1}, {:.1})",
            self.zoom,
            self.pan.x,
            self.pan.y
        );
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::identity()
    }
}
