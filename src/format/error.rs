//! Error types for label file operations.

use thiserror::Error;

/// Errors that can occur while reading or writing label files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A label line does not have the expected structure
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A field could not be read as a finite number
    #[error("Line {line}: invalid number '{value}' for {field}")]
    InvalidNumber {
        /// 1-based line number
        line: usize,
        /// Name of the field
        field: &'static str,
        /// The offending token
        value: String,
    },

    /// Normalized coordinates need the pixel size of the image
    #[error("Image dimensions required but not available (got {width}x{height})")]
    MissingDimensions {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },
}

impl FormatError {
    /// Create a parse error for a line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid number error for a field.
    pub fn invalid_number(line: usize, field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            line,
            field,
            value: value.into(),
        }
    }

    /// Line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. } | Self::InvalidNumber { line, .. } => Some(*line),
            _ => None,
        }
    }
}
