//! DEC Sixel graphics decoder.
//!
//! Sixel is a bitmap graphics protocol originally developed by DEC for their
//! VT240/VT330/VT340 terminals. Each data character in a Sixel stream encodes
//! a vertical column of 6 pixels, hence the name "six pixels" -> "sixel".
//!
//! This crate decodes a Sixel image body (the bytes between the DCS introducer
//! and the ST terminator, which the embedding terminal layer strips) into an
//! ARGB raster. It does not render, encode, or parse outer escape framing.
//!
//! ## Design
//!
//! - [`decoder::SixelDecoder`] is a one-shot decode session: a byte-oriented
//!   state machine over `Init`/`Ground`/`Raster`/`Color`/`Repeat` states.
//!   `decode()` consumes the session and returns either a finished
//!   [`SixelImage`] or a [`SixelError`]; there is no partial-image mode.
//! - [`palette::Palette`] is a sparse color-register table seeded from one of
//!   two standard 16-color presets (VT340 or CGA) and mutable via in-stream
//!   color definitions. A caller may lend its own palette to observe those
//!   definitions after decode.
//! - [`canvas::RasterCanvas`] (crate-internal) is a growable row-major pixel
//!   buffer. Sixel streams do not always declare their size up front, so the
//!   canvas grows in fixed increments as drawing proceeds, bounded by
//!   [`MAX_WIDTH`] x [`MAX_HEIGHT`].
//!
//! ## Security
//!
//! Sixel decoders are a classic attack surface: a short stream can request an
//! enormous repeat count or declare absurd raster dimensions
//! (CVE-2022-24130 pattern). This implementation clamps repeat counts to
//! [`MAX_REPEAT`] and the configured maximum width, enforces hard ceilings on
//! both declared and drawn extents, and fails the whole decode rather than
//! returning an oversized or partially corrupt buffer.
//!
//! ## Example
//!
//! ```
//! use sixel_core::{Rgb, SixelDecoder};
//!
//! // 10x20 raster declaration, color 0, one sixel with the bottom bit set.
//! let image = SixelDecoder::new(b"q\"1;1;10;20#0@-", Rgb::new(0, 0, 0), false)
//!     .decode()
//!     .unwrap();
//! assert_eq!(image.width(), 10);
//! ```

pub mod canvas;
pub mod decoder;
pub mod error;
pub mod palette;

#[cfg(test)]
mod tests;

pub use canvas::SixelImage;
pub use decoder::{SixelDecoder, GROWTH_INCREMENT, MAX_HEIGHT, MAX_REPEAT, MAX_WIDTH};
pub use error::SixelError;
pub use palette::{Palette, Rgb};
