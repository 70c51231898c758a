// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use itertools::Itertools;

use crate::color::{Texel, TexelImpl};
use crate::error::{TextureError, TextureResult};

mod defilter;

pub use defilter::defilter_table;

/// A color lookup table for the indexed formats. Loaded once per texture by
/// the container layer; the codec never mutates it.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Texel>,
}

impl Palette {
    pub fn new(colors: Vec<Texel>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> TextureResult<Texel> {
        self.colors
            .get(index)
            .copied()
            .ok_or(TextureError::PaletteIndexOutOfRange {
                index,
                len: self.colors.len(),
            })
    }

    /// Undo the platform-native interleave of a 256-entry palette, returning
    /// the colors in linear index order. 16-entry palettes are never stored
    /// interleaved and are rejected here.
    pub fn defiltered(&self) -> TextureResult<Palette> {
        if self.colors.len() != 256 {
            return Err(TextureError::InvalidPaletteSize {
                expected: 256,
                found: self.colors.len(),
            });
        }

        let table = defilter_table();
        let colors = table.iter().map(|&src| self.colors[src]).collect();
        Ok(Palette { colors })
    }

    /// Index of the entry nearest to `texel` by summed absolute channel
    /// difference. Exact matches resolve to the first matching entry.
    fn nearest(&self, texel: &Texel) -> usize {
        self.colors
            .iter()
            .map(|c| texel.rgba_distance(c))
            .position_min_by(f32::total_cmp)
            .expect("palette is never empty")
    }
}

/// Decode a 4bpp indexed texture: each byte holds two pixel indices, low
/// nibble first. Returns raw RGBA f32 pixels in raster order.
pub fn decode_4bpp(
    data: &[u8],
    palette: &Palette,
    width: usize,
    height: usize,
) -> TextureResult<Vec<f32>> {
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let mut pixels = Vec::with_capacity(width * height * 4);
    for row in data.chunks_exact(width / 2).take(height) {
        for pair in row {
            let left = palette.color((pair & 0x0F) as usize)?;
            let right = palette.color((pair >> 4) as usize)?;
            pixels.extend_from_slice(&[*left.r(), *left.g(), *left.b(), *left.a()]);
            pixels.extend_from_slice(&[*right.r(), *right.g(), *right.b(), *right.a()]);
        }
    }
    Ok(pixels)
}

/// Decode an 8bpp indexed texture: one index byte per pixel.
pub fn decode_8bpp(
    data: &[u8],
    palette: &Palette,
    width: usize,
    height: usize,
) -> TextureResult<Vec<f32>> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for &index in data.iter().take(width * height) {
        let color = palette.color(index as usize)?;
        pixels.extend_from_slice(&[*color.r(), *color.g(), *color.b(), *color.a()]);
    }
    Ok(pixels)
}

/// Encode raw RGBA f32 pixels as 4bpp indices against `palette`.
pub fn encode_4bpp(
    pixels: &[f32],
    palette: &Palette,
    width: usize,
    height: usize,
) -> TextureResult<Vec<u8>> {
    debug_assert!(palette.len() <= 16);
    let mut data = Vec::with_capacity(width * height / 2);
    for pair in pixels[..width * height * 4].chunks_exact(8) {
        let left = palette.nearest(&Texel::rgba(pair[0], pair[1], pair[2], pair[3])) as u8;
        let right = palette.nearest(&Texel::rgba(pair[4], pair[5], pair[6], pair[7])) as u8;
        data.push(left | (right << 4));
    }
    Ok(data)
}

/// Encode raw RGBA f32 pixels as 8bpp indices against `palette`.
pub fn encode_8bpp(
    pixels: &[f32],
    palette: &Palette,
    width: usize,
    height: usize,
) -> TextureResult<Vec<u8>> {
    debug_assert!(palette.len() <= 256);
    let mut data = Vec::with_capacity(width * height);
    for px in pixels[..width * height * 4].chunks_exact(4) {
        data.push(palette.nearest(&Texel::rgba(px[0], px[1], px[2], px[3])) as u8);
    }
    Ok(data)
}
