//! Dataset folders: images, their label files and the label catalogue.
//!
//! A dataset is a flat folder of images. Each image `name.ext` may have a
//! `name.txt` label file beside it, and the folder may hold a `labels.json`
//! catalogue of class names and colors.

mod catalog;
mod repository;

use std::path::PathBuf;

use thiserror::Error;

use crate::format::FormatError;

pub use catalog::LabelCatalog;
pub use repository::{DatasetRepository, Displayed, ImageRecord, SaveOutcome, label_path_for};

/// Errors from dataset folder operations.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// I/O error on a dataset file
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File or folder involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Label file or catalogue could not be read or written
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The folder holds no supported images
    #[error("No image files found in {0:?}")]
    NoImages(PathBuf),

    /// Image index outside the dataset
    #[error("Image index {index} out of range (dataset holds {len} images)")]
    UnknownImage {
        /// Requested index
        index: usize,
        /// Number of images in the dataset
        len: usize,
    },

    /// The image's pixel size could not be determined
    #[error("Failed to read dimensions of {path:?}: {source}")]
    ImageDimensions {
        /// Image file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },
}

impl DatasetError {
    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
