//! Error types for the crisp processing core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised inside a single filter stage.
///
/// These are recoverable: the pipeline substitutes the pre-stage image and
/// continues (see [`crate::pipeline::process_image`]).
#[derive(Error, Debug)]
pub enum FilterError {
    /// Blur/median kernel sizes must be odd and non-zero.
    #[error("kernel size must be odd and non-zero, got {0}")]
    InvalidKernelSize(u32),

    /// A caller-supplied convolution kernel was unusable.
    #[error("invalid custom kernel: {0}")]
    InvalidKernel(String),

    /// A numeric parameter was outside its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Per-image fatal errors: decoding and encoding.
///
/// Unlike [`FilterError`] these fail the whole image; the batch driver
/// records the failure and moves on to the next file.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Input file could not be read as an image.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Output file could not be encoded.
    #[error("failed to encode image to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Output file could not be written.
    #[error("failed to write image to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
