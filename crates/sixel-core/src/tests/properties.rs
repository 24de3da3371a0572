//! Property tests for the decoder.
//!
//! Random byte soup and random well-formed streams both have to uphold the
//! decoder's two global guarantees: no panic, and output bounded by the
//! configured maxima. Determinism is checked by decoding twice.

use proptest::prelude::*;

use crate::{Palette, Rgb, SixelDecoder, MAX_HEIGHT, MAX_WIDTH};

/// Strategy producing syntactically plausible Sixel fragments.
fn sixel_fragment() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(b"q".to_vec()),
        Just(b"$".to_vec()),
        Just(b"-".to_vec()),
        (0u32..300).prop_map(|i| format!("#{i}").into_bytes()),
        (0u32..300, 0u32..200, 0u32..200, 0u32..200)
            .prop_map(|(i, r, g, b)| format!("#{i};2;{r};{g};{b}").into_bytes()),
        (1u32..50_000).prop_map(|n| format!("!{n}").into_bytes()),
        (1u32..8, 1u32..8, 1u32..5000, 1u32..9000)
            .prop_map(|(pan, pad, w, h)| format!("\"{pan};{pad};{w};{h}").into_bytes()),
        proptest::collection::vec(0x3Fu8..0x7E, 1..32),
    ]
}

fn sixel_stream() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(sixel_fragment(), 0..24).prop_map(|fragments| {
        let mut data = b"q".to_vec();
        for fragment in fragments {
            data.extend_from_slice(&fragment);
        }
        data
    })
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = SixelDecoder::new(&data, Rgb::new(0, 0, 0), false).decode();
        let _ = SixelDecoder::new(&data, Rgb::new(30, 30, 30), true).decode();
    }

    #[test]
    fn output_extent_is_bounded(data in sixel_stream()) {
        if let Ok(image) = SixelDecoder::new(&data, Rgb::new(0, 0, 0), false).decode() {
            prop_assert!(image.width() >= 1 && image.width() <= MAX_WIDTH);
            prop_assert!(image.height() >= 1 && image.height() <= MAX_HEIGHT);
            prop_assert_eq!(image.pixels().len(), image.width() * image.height());
        }
    }

    #[test]
    fn decode_is_deterministic(data in sixel_stream()) {
        let first = SixelDecoder::new(&data, Rgb::new(0, 0, 0), false).decode();
        let second = SixelDecoder::new(&data, Rgb::new(0, 0, 0), false).decode();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn shared_and_owned_palettes_agree(data in sixel_stream()) {
        let mut palette = Palette::vt340();
        let shared = SixelDecoder::with_palette(&data, &mut palette, Rgb::new(0, 0, 0), false)
            .decode();
        let owned = SixelDecoder::new(&data, Rgb::new(0, 0, 0), false).decode();
        prop_assert_eq!(shared, owned);
    }
}
