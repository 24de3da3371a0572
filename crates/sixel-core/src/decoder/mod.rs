//! Sixel scan state machine.
//!
//! ## Protocol Elements
//!
//! The decoder consumes a Sixel image body byte by byte:
//!
//! - `Ps1 ; Ps2 ; Ps3 q` - init parameters and introducer (Ps2 = 1 requests
//!   a transparent background; Ps1 and Ps3 are ignored)
//! - `"Pan;Pad;Ph;Pv` - raster attributes (aspect ratio, declared size)
//! - `#Pc` - select color register
//! - `#Pc;Pu;Px;Py;Pz` - define color register (Pu = 2: RGB percentages)
//! - `!Pn` - repeat the next sixel character Pn times
//! - `$` - graphics carriage return
//! - `-` - graphics newline (down one 6-pixel band)
//! - `?` to `}` - sixel data (6-bit mask of vertical pixels)
//!
//! ## Design
//!
//! A single dispatch over a tagged state enum. Parameter states (`Init`,
//! `Raster`, `Color`) accumulate into a fixed 5-slot list; any byte that is
//! not a continuation of parameter accumulation first routes through one
//! shared flush that applies the pending command, then acts in `Ground`.
//!
//! ## Hardening
//!
//! Repeat counts are clamped to [`MAX_REPEAT`] and the maximum width
//! (CVE-2022-24130 pattern), and both declared and drawn extents are checked
//! against [`MAX_WIDTH`] x [`MAX_HEIGHT`]. Tripping either check sets an
//! abort that fails the whole decode; there is no partial image.

use arrayvec::ArrayVec;
use tracing::{trace, warn};

use crate::canvas::{RasterCanvas, SixelImage};
use crate::error::SixelError;
use crate::palette::{Palette, Rgb};

/// Maximum image width in pixels (4K-class).
pub const MAX_WIDTH: usize = 3840;

/// Maximum image height in pixels (3x the maximum width).
pub const MAX_HEIGHT: usize = 6480;

/// Canvas growth increment in pixels, per axis.
pub const GROWTH_INCREMENT: usize = 400;

/// Maximum honored repeat count; larger requests are silently clamped.
pub const MAX_REPEAT: u32 = 32767;

/// Fixed capacity of the command parameter list.
const MAX_PARAMS: usize = 5;

/// Height of one sixel band in pixels.
const BAND_HEIGHT: usize = 6;

/// First sixel data byte (`?`).
const SIXEL_DATA_MIN: u8 = 0x3F;

/// Last sixel data byte (`}`); the range is half-open at 0x7E.
const SIXEL_DATA_MAX: u8 = 0x7D;

/// Scan state for the byte-oriented parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Before the `q` introducer, collecting init parameters.
    Init,
    /// Idle, ready for the next command or sixel data byte.
    Ground,
    /// After `"`, collecting raster attributes.
    Raster,
    /// After `#`, collecting color parameters.
    Color,
    /// After `!`, collecting a repeat count.
    Repeat,
}

/// Palette owned by the session or lent by the caller.
#[derive(Debug)]
enum PaletteRef<'a> {
    Owned(Palette),
    Shared(&'a mut Palette),
}

impl PaletteRef<'_> {
    fn get(&self, index: u32) -> Option<Rgb> {
        match self {
            PaletteRef::Owned(palette) => palette.get(index),
            PaletteRef::Shared(palette) => palette.get(index),
        }
    }

    fn set(&mut self, index: u32, color: Rgb) {
        match self {
            PaletteRef::Owned(palette) => palette.set(index, color),
            PaletteRef::Shared(palette) => palette.set(index, color),
        }
    }
}

/// One-shot Sixel decode session.
///
/// Construct with the raw image body (outer DCS/ST framing already
/// stripped), then call [`decode`](Self::decode). The session is consumed:
/// re-decoding means constructing a new decoder.
///
/// ## Example
///
/// ```
/// use sixel_core::{Rgb, SixelDecoder};
///
/// let decoder = SixelDecoder::new(b"q#2}}}", Rgb::new(0, 0, 0), false);
/// let image = decoder.decode().unwrap();
/// assert_eq!(image.width(), 3);
/// assert_eq!(image.height(), 6);
/// ```
#[derive(Debug)]
pub struct SixelDecoder<'a> {
    /// Input bytes, consumed front to back.
    data: &'a [u8],
    palette: PaletteRef<'a>,
    /// Background fill for undrawn area when not transparent.
    background: Rgb,
    /// Whether the caller permits a transparent background at all.
    allow_transparency: bool,

    state: ScanState,
    /// Accumulated decimal parameters; the last slot is in progress.
    params: ArrayVec<u32, MAX_PARAMS>,
    /// Repeat accumulator; `None` is the unset sentinel.
    repeat: Option<u32>,

    /// Lazily allocated pixel buffer.
    canvas: Option<RasterCanvas>,
    /// Current drawing color, resolved at selection time.
    color: Rgb,
    /// Cursor column in pixels.
    x: usize,
    /// Top of the current sixel band in pixels.
    y: usize,
    /// Widest column reached by drawing (includes skip advances).
    max_x: usize,
    /// Topmost band that saw sixel data.
    max_y: usize,
    /// Whether any sixel data byte was processed.
    drawn: bool,
    /// Declared raster extent from raster attributes, 0 when absent.
    raster_width: usize,
    raster_height: usize,
    /// Negotiated transparency (caller allowed it AND the stream asked).
    transparent: bool,

    /// First hard failure; once set, the session discards its output.
    abort: Option<SixelError>,
}

impl<'a> SixelDecoder<'a> {
    /// Create a decode session with an owned VT340-preset palette.
    #[must_use]
    pub fn new(data: &'a [u8], background: Rgb, allow_transparency: bool) -> Self {
        Self::build(
            data,
            PaletteRef::Owned(Palette::vt340()),
            background,
            allow_transparency,
        )
    }

    /// Create a decode session over a caller-shared palette.
    ///
    /// In-stream color definitions mutate `palette` in place and remain
    /// visible to the caller after the decode finishes.
    #[must_use]
    pub fn with_palette(
        data: &'a [u8],
        palette: &'a mut Palette,
        background: Rgb,
        allow_transparency: bool,
    ) -> Self {
        Self::build(
            data,
            PaletteRef::Shared(palette),
            background,
            allow_transparency,
        )
    }

    fn build(
        data: &'a [u8],
        palette: PaletteRef<'a>,
        background: Rgb,
        allow_transparency: bool,
    ) -> Self {
        let mut params = ArrayVec::new();
        params.push(0);
        Self {
            data,
            palette,
            background,
            allow_transparency,
            state: ScanState::Init,
            params,
            repeat: None,
            canvas: None,
            color: Rgb::new(0, 0, 0),
            x: 0,
            y: 0,
            max_x: 0,
            max_y: 0,
            drawn: false,
            raster_width: 0,
            raster_height: 0,
            transparent: false,
            abort: None,
        }
    }

    /// Run the state machine over the whole buffer and extract the image.
    ///
    /// Any abort condition (malformed raster attributes, extent over the
    /// configured maxima) fails the whole decode; a stream that draws
    /// nothing fails with [`SixelError::NoImage`].
    pub fn decode(mut self) -> Result<SixelImage, SixelError> {
        for i in 0..self.data.len() {
            if self.abort.is_some() {
                break;
            }
            self.step(self.data[i]);
        }
        self.finish()
    }

    /// Dispatch one input byte against the current state.
    fn step(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' => self.digit(u32::from(byte - b'0')),
            b';' => self.separator(),
            // The introducer terminates init parameters; elsewhere `q`
            // falls through to the sixel-data arm below.
            b'q' if self.state == ScanState::Init => {
                self.apply_init();
                self.state = ScanState::Ground;
            }
            b'"' => {
                self.flush();
                self.enter_param_state(ScanState::Raster);
            }
            b'#' => {
                self.flush();
                self.enter_param_state(ScanState::Color);
            }
            b'!' => {
                self.flush();
                self.state = ScanState::Repeat;
                self.repeat = None;
            }
            b'-' => {
                self.flush();
                self.x = 0;
                self.y += BAND_HEIGHT;
            }
            b'$' => {
                self.flush();
                self.x = 0;
            }
            SIXEL_DATA_MIN..=SIXEL_DATA_MAX => {
                self.flush();
                self.draw(byte - SIXEL_DATA_MIN);
            }
            // Unknown bytes are not fatal.
            _ => {}
        }
    }

    /// Accumulate a decimal digit into the current parameter slot.
    fn digit(&mut self, value: u32) {
        match self.state {
            ScanState::Init | ScanState::Raster | ScanState::Color => {
                let slot = self.params.last_mut().expect("params list is never empty");
                *slot = slot.saturating_mul(10).saturating_add(value);
            }
            ScanState::Repeat => {
                let current = self.repeat.unwrap_or(0);
                self.repeat = Some(current.saturating_mul(10).saturating_add(value));
            }
            ScanState::Ground => {}
        }
    }

    /// Advance to the next parameter slot, capped at the slot capacity.
    ///
    /// Extra separators beyond capacity are silently absorbed.
    fn separator(&mut self) {
        match self.state {
            ScanState::Init | ScanState::Raster | ScanState::Color => {
                let _ = self.params.try_push(0);
            }
            ScanState::Ground | ScanState::Repeat => {}
        }
    }

    /// Apply whichever command is pending, then return to `Ground`.
    ///
    /// Invoked before every byte that is not a continuation of parameter
    /// accumulation. A pending repeat count is not a command; it survives
    /// until the sixel data byte that consumes it.
    fn flush(&mut self) {
        match self.state {
            ScanState::Init => self.apply_init(),
            ScanState::Raster => self.apply_raster(),
            ScanState::Color => self.apply_color(),
            ScanState::Ground | ScanState::Repeat => {}
        }
        self.state = ScanState::Ground;
    }

    fn enter_param_state(&mut self, state: ScanState) {
        self.state = state;
        self.params.clear();
        self.params.push(0);
    }

    /// Apply init parameters: `Ps1 ; Ps2 ; Ps3`.
    ///
    /// Ps1 (aspect ratio) and Ps3 (grid size) are ignored. Ps2 = 1 requests
    /// a transparent background, honored only when the caller allowed it.
    fn apply_init(&mut self) {
        let background_option = self.params.get(1).copied().unwrap_or(0);
        self.transparent = self.allow_transparency && background_option == 1;
        trace!(transparent = self.transparent, "sixel init");
    }

    /// Apply raster attributes: `Pan ; Pad ; Ph ; Pv`.
    ///
    /// Valid only with a square aspect ratio and positive declared size
    /// within the maxima; any validation failure aborts the decode.
    fn apply_raster(&mut self) {
        let numerator = self.params.first().copied().unwrap_or(0);
        let denominator = self.params.get(1).copied().unwrap_or(0);
        let width = self.params.get(2).copied().unwrap_or(0);
        let height = self.params.get(3).copied().unwrap_or(0);

        if numerator != denominator {
            warn!(numerator, denominator, "aborting: raster aspect mismatch");
            self.abort = Some(SixelError::AspectMismatch {
                numerator,
                denominator,
            });
            return;
        }
        if width == 0 || height == 0 {
            warn!(width, height, "aborting: empty raster size");
            self.abort = Some(SixelError::InvalidRasterSize { width, height });
            return;
        }
        let width = width as usize;
        let height = height as usize;
        if width > MAX_WIDTH || height > MAX_HEIGHT {
            warn!(width, height, "aborting: raster size over ceiling");
            self.abort = Some(SixelError::DimensionsExceeded { width, height });
            return;
        }

        trace!(width, height, "raster attributes");
        self.raster_width = width;
        self.raster_height = height;
        self.ensure_canvas(width, height);
    }

    /// Apply a color command: `#Pc` or `#Pc;Pu;Px;Py;Pz`.
    ///
    /// One parameter selects a register (undefined registers draw black).
    /// Exactly five parameters with Pu = 2 define the register from RGB
    /// percentage components without changing the current drawing color.
    /// Any other arity or color space is a no-op.
    fn apply_color(&mut self) {
        match self.params.as_slice() {
            [index] => {
                self.color = self.palette.get(*index).unwrap_or(Rgb::new(0, 0, 0));
            }
            [index, 2, r, g, b] => {
                let color = Rgb::from_percentages(*r, *g, *b);
                trace!(index, ?color, "color register defined");
                self.palette.set(*index, color);
            }
            [_, color_space, ..] => {
                trace!(color_space, "unrecognized color command ignored");
            }
            [] => {}
        }
    }

    /// Draw one sixel data byte, honoring a pending repeat count.
    ///
    /// `bits` is the 6-bit column mask; bit i sets the pixel at row offset i
    /// of the current band. A zero mask is the skip fast path: no pixels,
    /// but the cursor still advances.
    fn draw(&mut self, bits: u8) {
        let repeat = self.repeat.take().unwrap_or(1).clamp(1, MAX_REPEAT);
        let repeat = (repeat as usize).min(MAX_WIDTH);

        let needed_x = self.x + repeat;
        let needed_y = self.y + BAND_HEIGHT;
        if needed_x > MAX_WIDTH || needed_y > MAX_HEIGHT {
            warn!(
                width = needed_x,
                height = needed_y,
                "aborting: drawn extent over ceiling"
            );
            self.abort = Some(SixelError::DimensionsExceeded {
                width: needed_x,
                height: needed_y,
            });
            return;
        }

        self.ensure_canvas(needed_x, needed_y);
        if bits != 0 {
            let argb = self.color.to_argb();
            let canvas = self.canvas.as_mut().expect("canvas allocated above");
            for dx in 0..repeat {
                let x = self.x + dx;
                for bit in 0..BAND_HEIGHT {
                    if bits & (1 << bit) != 0 {
                        canvas.set_pixel(x, self.y + bit, argb);
                    }
                }
            }
        }

        self.x += repeat;
        self.max_x = self.max_x.max(self.x);
        self.max_y = self.max_y.max(self.y);
        self.drawn = true;
    }

    /// Grow (or lazily allocate) the canvas to cover `width` x `height`.
    ///
    /// Growth adds at least one increment per axis to amortize repeated
    /// resizes; the first allocation is at least one increment square.
    /// Callers have already checked the maxima.
    fn ensure_canvas(&mut self, width: usize, height: usize) {
        match &mut self.canvas {
            None => {
                let w = width.max(GROWTH_INCREMENT).min(MAX_WIDTH);
                let h = height.max(GROWTH_INCREMENT).min(MAX_HEIGHT);
                self.canvas = Some(RasterCanvas::new(w, h, self.background, self.transparent));
            }
            Some(canvas) => {
                if width > canvas.width() || height > canvas.height() {
                    let w = width
                        .max(canvas.width() + GROWTH_INCREMENT)
                        .min(MAX_WIDTH);
                    let h = height
                        .max(canvas.height() + GROWTH_INCREMENT)
                        .min(MAX_HEIGHT);
                    canvas.resize(w, h);
                }
            }
        }
    }

    /// Resolve the session into a finished image or a failure.
    fn finish(self) -> Result<SixelImage, SixelError> {
        if let Some(err) = self.abort {
            return Err(err);
        }

        let drawn_width = self.max_x;
        let drawn_height = if self.drawn {
            self.max_y + BAND_HEIGHT
        } else {
            0
        };

        // Pad up to the declared raster extent when one was supplied.
        let width = drawn_width.max(self.raster_width);
        let height = drawn_height.max(self.raster_height);

        match self.canvas {
            Some(canvas) if width > 0 && height > 0 => {
                Ok(canvas.crop(width, height, self.transparent))
            }
            _ => Err(SixelError::NoImage),
        }
    }
}


// Kani proofs
#[cfg(kani)]
mod verification {
    use super::*;

    #[kani::proof]
    fn sixel_mask_bounded() {
        let byte: u8 = kani::any();
        kani::assume((SIXEL_DATA_MIN..=SIXEL_DATA_MAX).contains(&byte));
        assert!(byte - SIXEL_DATA_MIN <= 62, "mask must be 6 bits");
    }

    #[kani::proof]
    fn repeat_clamp_bounded() {
        let requested: u32 = kani::any();
        let repeat = requested.clamp(1, MAX_REPEAT);
        let repeat = (repeat as usize).min(MAX_WIDTH);
        assert!(repeat >= 1 && repeat <= MAX_WIDTH);
    }

    #[kani::proof]
    fn digit_accumulation_saturates() {
        let slot: u32 = kani::any();
        let digit: u32 = kani::any();
        kani::assume(digit <= 9);
        let _ = slot.saturating_mul(10).saturating_add(digit);
    }

    #[kani::proof]
    fn canvas_growth_respects_maxima() {
        let current: usize = kani::any();
        let needed: usize = kani::any();
        kani::assume(current <= MAX_WIDTH);
        let grown = needed.max(current + GROWTH_INCREMENT).min(MAX_WIDTH);
        assert!(grown <= MAX_WIDTH);
    }
}
