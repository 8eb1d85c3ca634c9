//! Error types for mattekey.
//!
//! The per-pixel keying functions never fail. Everything here belongs to
//! configuration and to the decode/encode adapters around them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Failed to decode a source image.
    #[error("failed to load image from {path}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write a keyed image.
    #[error("failed to save image to {path}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Destination format cannot carry an alpha channel, or is not recognised.
    #[error("unsupported output format for {path}: {reason}")]
    UnsupportedOutputFormat { path: PathBuf, reason: String },

    /// Invalid keying parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Matte color could not be parsed.
    #[error("invalid matte color {input:?}: {reason}")]
    InvalidMatte { input: String, reason: String },

    /// Could not create the directory an output goes into.
    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mattekey operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
