//! Global constants for the annotation engine

/// Zoom multiplier applied per wheel notch
pub const ZOOM_STEP: f64 = 1.15;

/// Lowest allowed zoom level
pub const MIN_ZOOM: f64 = 0.1;

/// Highest allowed zoom level
pub const MAX_ZOOM: f64 = 10.0;

/// Number of snapshots kept by the undo history
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Class id of a box that has no label assigned
pub const UNASSIGNED_CLASS_ID: i32 = -1;

/// Extension of the per-image label files
pub const LABEL_FILE_EXTENSION: &str = "txt";

/// Label catalogue file stored in every dataset folder
pub const LABEL_CATALOG_FILENAME: &str = "labels.json";

/// Box outline color used when a class has no catalogue color
pub const FALLBACK_BOX_COLOR: [u8; 3] = [255, 0, 0];

/// Allowed range for the channel sum of generated label colors.
pub const COLOR_CHANNEL_SUM_MIN: u32 = 300;
/// Upper end of the generated label color brightness range.
pub const COLOR_CHANNEL_SUM_MAX: u32 = 600;

/// Image file extensions picked up when scanning a dataset folder (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];
