//! Sixel color registers.
//!
//! A Sixel stream selects drawing colors by small integer index into a table
//! of color registers. The table is seeded from one of two standard 16-color
//! presets and may be overwritten at any point by in-stream color definitions
//! (`#Pc;2;Pr;Pg;Pb` with components in DEC percentage units, 0-100).
//!
//! Register indices are caller-controlled integers with no guarantee of
//! contiguity, so the table is a sparse map rather than a dense array.
//! Looking up an undefined register is a legitimate case; the decoder falls
//! back to black.

use rustc_hash::FxHashMap;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from 0-255 channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from DEC percentage components (0-100 each).
    ///
    /// Components are clamped to 100 independently before scaling to 0-255,
    /// matching how Sixel color definitions are specified.
    #[must_use]
    pub fn from_percentages(r: u32, g: u32, b: u32) -> Self {
        Self {
            r: scale_percent(r),
            g: scale_percent(g),
            b: scale_percent(b),
        }
    }

    /// Pack as opaque ARGB (`0xFFRRGGBB`).
    #[must_use]
    pub const fn to_argb(self) -> u32 {
        0xFF00_0000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Scale a DEC percentage component (0-100) to a 0-255 channel value.
#[inline]
fn scale_percent(value: u32) -> u8 {
    u8::try_from(value.min(100) * 255 / 100).expect("clamped percentage fits in u8")
}

/// VT340 default palette in DEC percentage units, indexed by register.
///
/// The muted colors DEC shipped on the VT340: a dim primary ramp in
/// registers 1-6, grays at 7/8/15, and a brighter ramp in 9-14.
const VT340_PERCENTAGES: [(u32, u32, u32); 16] = [
    (0, 0, 0),    // 0: black
    (20, 20, 80), // 1: blue
    (80, 13, 13), // 2: red
    (20, 80, 20), // 3: green
    (80, 20, 80), // 4: magenta
    (20, 80, 80), // 5: cyan
    (80, 80, 20), // 6: yellow
    (53, 53, 53), // 7: gray 50%
    (26, 26, 26), // 8: gray 25%
    (33, 33, 60), // 9: blue*
    (60, 26, 26), // 10: red*
    (33, 60, 33), // 11: green*
    (60, 33, 60), // 12: magenta*
    (33, 60, 60), // 13: cyan*
    (60, 60, 33), // 14: yellow*
    (80, 80, 80), // 15: gray 75%
];

/// Classic CGA 16-color palette, indexed by register.
const CGA_COLORS: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // 0: black
    Rgb::new(0, 0, 170),     // 1: blue
    Rgb::new(0, 170, 0),     // 2: green
    Rgb::new(0, 170, 170),   // 3: cyan
    Rgb::new(170, 0, 0),     // 4: red
    Rgb::new(170, 0, 170),   // 5: magenta
    Rgb::new(170, 85, 0),    // 6: brown
    Rgb::new(170, 170, 170), // 7: light gray
    Rgb::new(85, 85, 85),    // 8: dark gray
    Rgb::new(85, 85, 255),   // 9: light blue
    Rgb::new(85, 255, 85),   // 10: light green
    Rgb::new(85, 255, 255),  // 11: light cyan
    Rgb::new(255, 85, 85),   // 12: light red
    Rgb::new(255, 85, 255),  // 13: light magenta
    Rgb::new(255, 255, 85),  // 14: yellow
    Rgb::new(255, 255, 255), // 15: white
];

/// Sparse table of Sixel color registers.
///
/// Mutations performed during a decode (in-stream color definitions) are
/// visible to the caller afterwards when the palette was lent to the decoder
/// via [`crate::SixelDecoder::with_palette`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: FxHashMap<u32, Rgb>,
}

impl Palette {
    /// Create a palette seeded with the VT340 default colors.
    #[must_use]
    pub fn vt340() -> Self {
        let mut palette = Self {
            colors: FxHashMap::default(),
        };
        palette.load_vt340();
        palette
    }

    /// Create a palette seeded with the classic CGA colors.
    #[must_use]
    pub fn cga() -> Self {
        let mut palette = Self {
            colors: FxHashMap::default(),
        };
        palette.load_cga();
        palette
    }

    /// Clear the palette and repopulate registers 0-15 with the VT340 preset.
    pub fn load_vt340(&mut self) {
        self.colors.clear();
        for (i, &(r, g, b)) in VT340_PERCENTAGES.iter().enumerate() {
            self.colors.insert(i as u32, Rgb::from_percentages(r, g, b));
        }
    }

    /// Clear the palette and repopulate registers 0-15 with the CGA preset.
    pub fn load_cga(&mut self) {
        self.colors.clear();
        for (i, &color) in CGA_COLORS.iter().enumerate() {
            self.colors.insert(i as u32, color);
        }
    }

    /// Look up a color register.
    ///
    /// Undefined registers return `None`; the decoder draws those in black.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<Rgb> {
        self.colors.get(&index).copied()
    }

    /// Define or overwrite a color register.
    pub fn set(&mut self, index: u32, color: Rgb) {
        self.colors.insert(index, color);
    }

    /// Number of defined registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no registers are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Iterate over defined `(register, color)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Rgb)> + '_ {
        self.colors.iter().map(|(&index, &color)| (index, color))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::vt340()
    }
}
