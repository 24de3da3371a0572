//! Growable raster canvas and the finished image it produces.
//!
//! Sixel streams do not always declare their size up front (raster attributes
//! are optional), so the in-progress image lives in a buffer that grows
//! speculatively as drawing proceeds. Growth reallocates, fills the new area
//! with the background policy, and copies every previously drawn pixel at its
//! original coordinate; it never shrinks during a decode.
//!
//! Pixels are stored row-major as packed ARGB (`0xAARRGGBB`). A transparent
//! background is all-zero (alpha 0); an opaque one is the background color
//! with alpha 255. Drawn pixels are always opaque.

use crate::palette::Rgb;

/// In-progress pixel buffer for one decode session.
///
/// The state machine always resizes before writing, so `set_pixel` writes
/// unchecked against logical bounds (debug-asserted).
#[derive(Debug, Clone)]
pub(crate) struct RasterCanvas {
    /// Row-major ARGB pixels, `width * height` entries.
    pixels: Vec<u32>,
    width: usize,
    height: usize,
    /// Fill value for undrawn area: 0 when transparent, opaque background
    /// color otherwise.
    fill: u32,
}

impl RasterCanvas {
    /// Allocate a canvas pre-filled with the background policy.
    pub(crate) fn new(width: usize, height: usize, background: Rgb, transparent: bool) -> Self {
        let fill = if transparent { 0 } else { background.to_argb() };
        Self {
            pixels: vec![fill; width * height],
            width,
            height,
            fill,
        }
    }

    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    /// Grow the buffer to `new_width` x `new_height`.
    ///
    /// New area takes the background fill; previously drawn content keeps its
    /// original coordinates. Shrinking is not used during decode, but smaller
    /// dimensions are tolerated and crop the copy.
    pub(crate) fn resize(&mut self, new_width: usize, new_height: usize) {
        if new_width == self.width && new_height == self.height {
            return;
        }
        let mut pixels = vec![self.fill; new_width * new_height];
        for y in 0..self.height.min(new_height) {
            let src = y * self.width;
            let dst = y * new_width;
            let len = self.width.min(new_width);
            pixels[dst..dst + len].copy_from_slice(&self.pixels[src..src + len]);
        }
        self.pixels = pixels;
        self.width = new_width;
        self.height = new_height;
    }

    /// Write one pixel. The caller guarantees `(x, y)` is in bounds.
    #[inline]
    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, argb: u32) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[y * self.width + x] = argb;
    }

    /// Extract the final image, trimming allocated-but-unused buffer space.
    ///
    /// Area outside the canvas (when the final extent is padded up to a
    /// declared raster size larger than the allocation) takes the background
    /// fill.
    pub(crate) fn crop(&self, width: usize, height: usize, transparent: bool) -> SixelImage {
        let mut pixels = vec![self.fill; width * height];
        for y in 0..height.min(self.height) {
            let src = y * self.width;
            let dst = y * width;
            let len = width.min(self.width);
            pixels[dst..dst + len].copy_from_slice(&self.pixels[src..src + len]);
        }
        SixelImage {
            pixels,
            width,
            height,
            transparent,
        }
    }
}

/// A finished, decoded Sixel image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SixelImage {
    /// ARGB pixel data (`0xAARRGGBB`), row-major.
    pixels: Vec<u32>,
    width: usize,
    height: usize,
    transparent: bool,
}

impl SixelImage {
    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw ARGB pixel data (`0xAARRGGBB`), row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Consume the image and return the raw pixel data.
    #[inline]
    #[must_use]
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Whether the stream negotiated a transparent background.
    #[inline]
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Number of terminal rows this image spans for a given cell height.
    #[must_use]
    pub fn rows_spanned(&self, cell_height: usize) -> usize {
        if cell_height == 0 || self.height == 0 {
            return 0;
        }
        self.height.div_ceil(cell_height)
    }

    /// Number of terminal columns this image spans for a given cell width.
    #[must_use]
    pub fn cols_spanned(&self, cell_width: usize) -> usize {
        if cell_width == 0 || self.width == 0 {
            return 0;
        }
        self.width.div_ceil(cell_width)
    }
}
