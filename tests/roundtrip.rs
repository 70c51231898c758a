// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Cursor;

use anyhow::Result;
use image::{Rgba, Rgba32FImage};

use nutex::codec::{decode, encode, TextureFormat, TextureInfo};
use nutex::color::{Texel, TexelImpl};
use nutex::error::TextureError;
use nutex::indexed::{defilter_table, Palette};

fn info(format: TextureFormat, width: u32, height: u32) -> TextureInfo {
    TextureInfo {
        width,
        height,
        levels: 1,
        format,
        palette: None,
    }
}

fn solid(width: u32, height: u32, rgba: [f32; 4]) -> Rgba32FImage {
    Rgba32FImage::from_pixel(width, height, Rgba(rgba))
}

fn encode_to_vec(image: &Rgba32FImage, info: &TextureInfo) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    encode(image, &mut data, info)?;
    Ok(data)
}

#[test]
fn solid_red_tile_round_trips_exactly() -> Result<()> {
    let info = info(TextureFormat::Dxt1, 4, 4);
    let data = encode_to_vec(&solid(4, 4, [1.0, 0.0, 0.0, 1.0]), &info)?;
    assert_eq!(data.len(), 8, "one DXT1 block");

    let image = decode(&mut Cursor::new(data), &info)?;
    for pixel in image.pixels() {
        assert_eq!(pixel.0, [1.0, 0.0, 0.0, 1.0], "red quantizes losslessly");
    }
    Ok(())
}

#[test]
fn gray_tile_collapses_to_one_palette_entry() -> Result<()> {
    let info = info(TextureFormat::Dxt1, 4, 4);
    let data = encode_to_vec(&solid(4, 4, [0.5, 0.5, 0.5, 1.0]), &info)?;

    // identical samples: both endpoints hold the same quantized gray
    assert_eq!(data[0..2], data[2..4], "endpoints must match");

    let image = decode(&mut Cursor::new(data), &info)?;
    let gray = [16.0 / 31.0, 32.0 / 63.0, 16.0 / 31.0, 1.0];
    for pixel in image.pixels() {
        assert_eq!(pixel.0, gray);
    }
    Ok(())
}

#[test]
fn endpoint_order_flips_decode_mode() -> Result<()> {
    let info = info(TextureFormat::Dxt1, 4, 4);
    // red/blue endpoints, every index 3
    let forward: Vec<u8> = vec![0x00, 0xF8, 0x1F, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
    let swapped: Vec<u8> = vec![0x1F, 0x00, 0x00, 0xF8, 0xFF, 0xFF, 0xFF, 0xFF];

    let four_color = decode(&mut Cursor::new(forward), &info)?;
    let punch_through = decode(&mut Cursor::new(swapped), &info)?;

    for (a, b) in four_color.pixels().zip(punch_through.pixels()) {
        assert_eq!(a.0[3], 1.0, "four-color mode has no transparency");
        assert_eq!(b.0, [0.0, 0.0, 0.0, 0.0], "index 3 is punch-through");
    }
    Ok(())
}

#[test]
fn dxt3_alpha_plane_is_exact_at_four_bits() -> Result<()> {
    let info = info(TextureFormat::Dxt3, 4, 4);
    let image = Rgba32FImage::from_fn(4, 4, |x, y| {
        Rgba([0.5, 0.5, 0.5, (y * 4 + x) as f32 / 15.0])
    });

    let data = encode_to_vec(&image, &info)?;
    assert_eq!(data.len(), 16, "one DXT3 block");

    let decoded = decode(&mut Cursor::new(data), &info)?;
    for (x, y, pixel) in decoded.enumerate_pixels() {
        let want = (y * 4 + x) as f32 / 15.0;
        assert!(
            (pixel.0[3] - want).abs() < 1e-6,
            "alpha at ({x},{y}): {} != {want}",
            pixel.0[3]
        );
    }
    Ok(())
}

#[test]
fn dxt5_preserves_forced_extremes() -> Result<()> {
    let info = info(TextureFormat::Dxt5, 4, 4);
    let image = Rgba32FImage::from_fn(4, 4, |x, _| {
        let alpha = match x {
            0 => 0.0,
            1 => 1.0,
            2 => 0.4,
            _ => 0.6,
        };
        Rgba([0.25, 0.5, 0.75, alpha])
    });

    let data = encode_to_vec(&image, &info)?;
    assert_eq!(data.len(), 16, "one DXT5 block");
    assert!(data[0] <= data[1], "extreme samples force the 6-value mode");

    let decoded = decode(&mut Cursor::new(data), &info)?;
    for (x, _, pixel) in decoded.enumerate_pixels() {
        match x {
            0 => assert_eq!(pixel.0[3], 0.0),
            1 => assert_eq!(pixel.0[3], 1.0),
            x => {
                let want = if x == 2 { 0.4 } else { 0.6 };
                assert!((pixel.0[3] - want).abs() < 1.0 / 255.0 + 1e-6);
            }
        }
    }
    Ok(())
}

#[test]
fn partial_tiles_store_whole_blocks() -> Result<()> {
    let info = info(TextureFormat::Dxt1, 5, 3);
    let data = encode_to_vec(&solid(5, 3, [0.5, 0.5, 0.5, 1.0]), &info)?;
    assert_eq!(data.len(), 16, "5x3 pixels cover 2x1 blocks");

    let mut reader = Cursor::new(data);
    let image = decode(&mut reader, &info)?;
    assert_eq!(reader.position(), 16);
    assert_eq!((image.width(), image.height()), (5, 3));

    let gray = [16.0 / 31.0, 32.0 / 63.0, 16.0 / 31.0, 1.0];
    for pixel in image.pixels() {
        assert_eq!(pixel.0, gray);
    }
    Ok(())
}

#[test]
fn indexed_consumes_exactly_the_declared_bytes() -> Result<()> {
    let palette16 = Palette::new(
        (0..16)
            .map(|i| Texel::rgba(i as f32 / 15.0, 0.0, 0.0, 1.0))
            .collect(),
    );

    let mut desc = info(TextureFormat::Indexed4, 8, 8);
    desc.palette = Some(palette16);

    let payload: Vec<u8> = (0..40).map(|i| i as u8).collect();
    let mut reader = Cursor::new(payload);
    decode(&mut reader, &desc)?;
    assert_eq!(reader.position(), 32, "4bpp consumes w*h/2 bytes");

    // one byte fewer than required
    let mut short = Cursor::new(vec![0u8; 31]);
    let err = decode(&mut short, &desc).unwrap_err();
    assert!(matches!(err, TextureError::TruncatedStream { expected: 32 }));
    Ok(())
}

#[test]
fn indexed_8bpp_round_trips_through_the_palette() -> Result<()> {
    let palette = Palette::new(
        (0..256)
            .map(|i| Texel::rgba(i as f32 / 255.0, (255 - i) as f32 / 255.0, 0.0, 1.0))
            .collect(),
    );

    let mut desc = info(TextureFormat::Indexed8, 16, 4);
    desc.palette = Some(palette);

    let payload: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
    let image = decode(&mut Cursor::new(payload.clone()), &desc)?;

    let reencoded = encode_to_vec(&image, &desc)?;
    assert_eq!(reencoded, payload, "distinct palette entries round-trip");
    Ok(())
}

#[test]
fn defiltered_palette_applies_the_permutation_once() -> Result<()> {
    let palette = Palette::new(
        (0..256)
            .map(|i| Texel::rgba(i as f32 / 255.0, 0.0, 0.0, 1.0))
            .collect(),
    );
    let defiltered = palette.defiltered()?;

    let table = defilter_table();
    for (i, &src) in table.iter().enumerate() {
        assert_eq!(
            *defiltered.color(i)?.r(),
            *palette.color(src)?.r(),
            "entry {i} must come from stored offset {src}"
        );
    }

    // decoding through the defiltered palette matches a by-hand table lookup
    let mut desc = info(TextureFormat::Indexed8, 16, 16);
    desc.palette = Some(defiltered);
    let payload: Vec<u8> = (0u8..=255).collect();
    let image = decode(&mut Cursor::new(payload), &desc)?;
    for (x, y, pixel) in image.enumerate_pixels() {
        let index = (y * 16 + x) as usize;
        assert_eq!(pixel.0[0], table[index] as f32 / 255.0);
    }
    Ok(())
}

#[test]
fn unsupported_tags_fail_up_front() {
    let desc = info(TextureFormat::from_tag(0x42), 8, 8);
    let mut reader = Cursor::new(vec![0u8; 64]);
    let err = decode(&mut reader, &desc).unwrap_err();
    assert!(matches!(err, TextureError::UnsupportedFormat { tag: 0x42 }));
    assert_eq!(reader.position(), 0);

    let mut sink = Vec::new();
    let err = encode(&solid(8, 8, [0.0; 4]), &mut sink, &desc).unwrap_err();
    assert!(matches!(err, TextureError::UnsupportedFormat { tag: 0x42 }));
    assert!(sink.is_empty(), "nothing may be written");
}
