//! Color utility functions for label categories.
//!
//! Label colors are stored as `#RRGGBB` strings in `labels.json` and
//! generated with a random hue when a category has none.

use rand::Rng;

use crate::constants::{COLOR_CHANNEL_SUM_MAX, COLOR_CHANNEL_SUM_MIN};

/// Attempts at drawing a random saturation/value pair before falling back.
const MAX_COLOR_ATTEMPTS: usize = 32;

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

fn hsv_to_rgb8(h: f32, s: f32, v: f32) -> [u8; 3] {
    let (r, g, b) = hsv_to_rgb(h, s, v);
    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}

/// Whether the color is neither too dark nor too light to draw boxes with.
pub fn has_usable_brightness(color: [u8; 3]) -> bool {
    let sum: u32 = color.iter().map(|&c| u32::from(c)).sum();
    (COLOR_CHANNEL_SUM_MIN..=COLOR_CHANNEL_SUM_MAX).contains(&sum)
}

/// Generate a label color with a random hue and a usable brightness.
pub fn random_label_color<R: Rng + ?Sized>(rng: &mut R) -> [u8; 3] {
    let hue = rng.random_range(0.0..360.0_f32);

    for _ in 0..MAX_COLOR_ATTEMPTS {
        let saturation = rng.random_range(0.3..=1.0_f32);
        let value = rng.random_range(0.4..=1.0_f32);
        let color = hsv_to_rgb8(hue, saturation, value);
        if has_usable_brightness(color) {
            return color;
        }
    }

    // Any hue at this saturation/value sums to between 368 and 490.
    hsv_to_rgb8(hue, 0.6, 0.8)
}

/// Format a color as `#RRGGBB`.
pub fn to_hex(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Parse a `#RRGGBB` string. Returns `None` for anything else.
pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
