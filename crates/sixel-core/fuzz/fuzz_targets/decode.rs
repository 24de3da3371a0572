//! Adversarial Sixel fuzzer targeting known CVE patterns.
//!
//! ## Running
//!
//! ```bash
//! cd crates/sixel-core
//! cargo +nightly fuzz run decode -- -max_total_time=600
//! ```
//!
//! ## Security Properties
//!
//! 1. No panic on any input
//! 2. No unbounded memory allocation (extent ceilings hold)
//! 3. Hard failures produce no image at all

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use sixel_core::{Rgb, SixelDecoder, MAX_HEIGHT, MAX_WIDTH};

/// Known attack patterns derived from Sixel decoder CVEs.
const ATTACK_PATTERNS: &[&[u8]] = &[
    // Repeat-count amplification (CVE-2022-24130 pattern)
    b"!4294967295}",
    b"!32768~",
    b"!99999999!99999999}",
    // Oversized raster attributes
    b"\"1;1;4294967295;4294967295",
    b"\"1;1;99999999999999999999;2",
    // Aspect-ratio garbage
    b"\"0;9;100;100",
    // Register floods
    b"#4294967295",
    b"#1000;2;999;999;999",
    // Band flood
    b"-------------------------------",
];

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Indices into ATTACK_PATTERNS to interleave.
    pattern_picks: Vec<u8>,
    /// Raw bytes appended between patterns.
    filler: Vec<u8>,
    allow_transparency: bool,
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };

    let mut stream = b"0;1;0q".to_vec();
    let mut filler = input.filler.iter();
    for &pick in input.pattern_picks.iter().take(32) {
        stream.extend_from_slice(ATTACK_PATTERNS[pick as usize % ATTACK_PATTERNS.len()]);
        if let Some(&byte) = filler.next() {
            stream.push(byte);
        }
    }
    stream.extend(filler);

    let result = SixelDecoder::new(&stream, Rgb::new(0, 0, 0), input.allow_transparency).decode();
    if let Ok(image) = result {
        assert!(image.width() <= MAX_WIDTH);
        assert!(image.height() <= MAX_HEIGHT);
        assert_eq!(image.pixels().len(), image.width() * image.height());
    }
});
