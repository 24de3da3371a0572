//! Decode failure taxonomy.
//!
//! Every hard failure collapses to the same outcome: the decode produces no
//! image. Soft anomalies (unknown bytes, undefined palette indices,
//! unrecognized color spaces, oversized repeat counts) are recovered
//! in-stream and never surface here.

use thiserror::Error;

/// Errors that terminate a Sixel decode with no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SixelError {
    /// The input drew no pixels (empty or command-only stream).
    #[error("no image: stream drew no pixels")]
    NoImage,

    /// Raster attributes with a non-square aspect ratio.
    #[error("raster attributes aspect ratio {numerator}:{denominator} is not 1:1")]
    AspectMismatch {
        /// Declared aspect numerator (Pan).
        numerator: u32,
        /// Declared aspect denominator (Pad).
        denominator: u32,
    },

    /// Raster attributes declared a zero-sized image.
    #[error("raster attributes declared empty size {width}x{height}")]
    InvalidRasterSize {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
    },

    /// Declared or drawn extent exceeded the configured maxima.
    ///
    /// This is the adversarial-input defense: rather than hand back a
    /// possibly enormous buffer, the whole decode fails.
    #[error("image extent {width}x{height} exceeds maximum dimensions")]
    DimensionsExceeded {
        /// Offending width in pixels.
        width: usize,
        /// Offending height in pixels.
        height: usize,
    },
}
