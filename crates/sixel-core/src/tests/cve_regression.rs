//! CVE Regression Tests
//!
//! Tests for attack patterns derived from real Sixel decoder vulnerabilities.
//! Each test ensures the decoder handles hostile input with bounded memory
//! and no panic: it either produces a correctly clamped image or fails
//! cleanly with no image at all.
//!
//! ## References
//!
//! - CVE-2022-24130: xterm sixel buffer overflow via crafted repeat counts
//! - CVE-2008-2383: xterm DECRQSS-era hostile escape data
//! - libsixel issue history: oversized raster attributes, register floods
//!
//! ## Test Categories
//!
//! 1. Repeat-count amplification
//! 2. Raster-attribute dimension attacks
//! 3. Parameter overflow and flooding
//! 4. Band-advance resource exhaustion

use crate::{Rgb, SixelDecoder, MAX_HEIGHT, MAX_WIDTH};

/// Feed hostile data and verify the bounded-output invariant.
fn verify_after_feed(data: &[u8]) {
    let result = SixelDecoder::new(data, Rgb::new(0, 0, 0), false).decode();
    if let Ok(image) = result {
        assert!(image.width() <= MAX_WIDTH, "width out of bounds");
        assert!(image.height() <= MAX_HEIGHT, "height out of bounds");
        assert_eq!(image.pixels().len(), image.width() * image.height());
    }
    // Err is acceptable: hard failure, no image. Key: no panic either way.
}

// ============================================================================
// CVE-2022-24130 Pattern: Repeat-Count Amplification
// ============================================================================

#[test]
fn cve_repeat_count_max_u32() {
    verify_after_feed(b"q!4294967295}");
}

#[test]
fn cve_repeat_count_many_digits() {
    let mut data = b"q!".to_vec();
    data.extend(std::iter::repeat(b'9').take(10_000));
    data.push(b'}');
    verify_after_feed(&data);
}

#[test]
fn cve_repeat_count_stacked_runs() {
    // Many maximal runs across many bands.
    let mut data = b"q".to_vec();
    for _ in 0..64 {
        data.extend_from_slice(b"!32767}-");
    }
    verify_after_feed(&data);
}

#[test]
fn cve_repeat_zero_then_draw() {
    // Repeat of 0 must behave as 1, not underflow.
    verify_after_feed(b"q!0}");
}

// ============================================================================
// Raster-Attribute Dimension Attacks
// ============================================================================

#[test]
fn cve_raster_max_u32_dimensions() {
    verify_after_feed(b"q\"1;1;4294967295;4294967295#0}");
}

#[test]
fn cve_raster_overflow_digits() {
    verify_after_feed(b"q\"1;1;99999999999999999999;2#0}");
}

#[test]
fn cve_raster_redeclared_repeatedly() {
    let mut data = b"q".to_vec();
    for _ in 0..1_000 {
        data.extend_from_slice(b"\"1;1;100;100");
    }
    data.extend_from_slice(b"#0}");
    verify_after_feed(&data);
}

// ============================================================================
// Parameter Overflow and Flooding
// ============================================================================

#[test]
fn cve_color_register_max_u32() {
    verify_after_feed(b"q#4294967295}");
}

#[test]
fn cve_color_definition_flood() {
    // Define thousands of registers; memory stays proportional to the count,
    // and the decode still succeeds.
    let mut data = b"q".to_vec();
    for i in 0..5_000 {
        data.extend_from_slice(format!("#{i};2;50;50;50").as_bytes());
    }
    data.extend_from_slice(b"#0}");
    verify_after_feed(&data);
}

#[test]
fn cve_separator_flood() {
    let mut data = b"q\"1".to_vec();
    data.extend(std::iter::repeat(b';').take(100_000));
    data.extend_from_slice(b"1;4;6#0}");
    verify_after_feed(&data);
}

#[test]
fn cve_component_percentages_over_100() {
    let image = SixelDecoder::new(b"q#9;2;999;999;999#9}", Rgb::new(0, 0, 0), false)
        .decode()
        .unwrap();
    // Components clamp to 100% each.
    assert_eq!(image.pixel(0, 1), Some(Rgb::new(255, 255, 255).to_argb()));
}

// ============================================================================
// Band-Advance Resource Exhaustion
// ============================================================================

#[test]
fn cve_newline_flood() {
    let mut data = b"q}".to_vec();
    data.extend(std::iter::repeat(b'-').take(1_000_000));
    verify_after_feed(&data);
}

#[test]
fn cve_full_canvas_then_one_more_band() {
    let mut data = b"q".to_vec();
    for _ in 0..(MAX_HEIGHT / 6) {
        data.extend_from_slice(b"}-");
    }
    data.push(b'}');
    let result = SixelDecoder::new(&data, Rgb::new(0, 0, 0), false).decode();
    assert!(result.is_err(), "drawing past the height ceiling must fail");
}

#[test]
fn cve_interleaved_garbage() {
    // Hostile mix of valid commands, control bytes, and high-bit garbage.
    let mut data = b"q".to_vec();
    for i in 0..10_000u32 {
        data.push((i % 256) as u8);
        if i % 97 == 0 {
            data.extend_from_slice(b"#1}");
        }
    }
    verify_after_feed(&data);
}
