// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::{Read, Write};

use image::Rgba32FImage;
use rayon::prelude::*;
use tracing::debug;

use crate::color::{Texel, TexelImpl};
use crate::error::{TextureError, TextureResult};
use crate::indexed::{self, Palette};
use crate::s3tc::{self, Block, Dxt1Block, Dxt3Block, Dxt5Block};
use crate::tile::Tile;

/// Every pixel format this crate can transform, plus a catch-all for tags
/// the containers use but the codec does not understand. Unsupported tags
/// fail explicitly; they never produce best-effort output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum TextureFormat {
    Dxt1,
    Dxt3,
    Dxt5,
    Indexed4,
    Indexed8,
    Unsupported(u32),
}

impl TextureFormat {
    /// Map a texture type tag as stored in the NU container texture
    /// descriptors.
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            0x0C => TextureFormat::Dxt1,
            0x0F => TextureFormat::Dxt5,
            other => TextureFormat::Unsupported(other),
        }
    }

    /// Map a DDS FourCC code, for textures that embed a DDS payload.
    pub fn from_four_cc(four_cc: &[u8; 4]) -> Self {
        match four_cc {
            b"DXT1" => TextureFormat::Dxt1,
            b"DXT3" => TextureFormat::Dxt3,
            b"DXT5" => TextureFormat::Dxt5,
            other => TextureFormat::Unsupported(u32::from_le_bytes(*other)),
        }
    }

    /// Exact byte length of one surface of `width` x `height` pixels in this
    /// format.
    pub fn data_len(&self, width: u32, height: u32) -> TextureResult<usize> {
        let (w, h) = (width as usize, height as usize);
        match self {
            TextureFormat::Dxt1 => Ok(s3tc::block_count(w, h) * Dxt1Block::SIZE),
            TextureFormat::Dxt3 => Ok(s3tc::block_count(w, h) * Dxt3Block::SIZE),
            TextureFormat::Dxt5 => Ok(s3tc::block_count(w, h) * Dxt5Block::SIZE),
            TextureFormat::Indexed4 => {
                if width % 2 != 0 {
                    Err(TextureError::OddWidth { width })
                } else {
                    Ok(w * h / 2)
                }
            }
            TextureFormat::Indexed8 => Ok(w * h),
            TextureFormat::Unsupported(tag) => Err(TextureError::UnsupportedFormat { tag: *tag }),
        }
    }
}

/// Everything the codec needs to know about one texture. The container layer
/// owns this: it locates the pixel data, reads these fields from its own
/// schema, and positions the stream.
#[derive(Clone)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    /// Mip level count as recorded by the container. The codec transforms
    /// the level-0 surface; [`TextureInfo::mip_extents`] gives the chain.
    pub levels: u32,
    pub format: TextureFormat,
    /// Color table for the indexed formats; ignored by the block formats.
    pub palette: Option<Palette>,
}

impl TextureInfo {
    /// Byte length of the level-0 surface.
    pub fn data_len(&self) -> TextureResult<usize> {
        self.format.data_len(self.width, self.height)
    }

    /// The width/height of each mip level, halving down to 1x1 at most.
    pub fn mip_extents(&self) -> impl Iterator<Item = (u32, u32)> {
        let mut extent = (self.width, self.height);
        (0..self.levels).map(move |_| {
            let current = extent;
            extent = ((extent.0 / 2).max(1), (extent.1 / 2).max(1));
            current
        })
    }

    fn palette_for(&self, expected: usize) -> TextureResult<&Palette> {
        match &self.palette {
            Some(palette) if palette.len() == expected => Ok(palette),
            Some(palette) => Err(TextureError::InvalidPaletteSize {
                expected,
                found: palette.len(),
            }),
            None => Err(TextureError::InvalidPaletteSize { expected, found: 0 }),
        }
    }

    fn validate(&self) -> TextureResult<usize> {
        let expected = self.data_len()?;
        match self.format {
            TextureFormat::Indexed4 => {
                self.palette_for(16)?;
            }
            TextureFormat::Indexed8 => {
                self.palette_for(256)?;
            }
            _ => {}
        }
        Ok(expected)
    }
}

/// Decode one texture from `reader`, which must be positioned at the start
/// of its pixel data. Reads exactly the surface's byte length and nothing
/// more.
pub fn decode(reader: &mut impl Read, info: &TextureInfo) -> TextureResult<Rgba32FImage> {
    let expected = info.validate()?;
    let (w, h) = (info.width as usize, info.height as usize);

    debug!(
        format = %info.format,
        width = info.width,
        height = info.height,
        bytes = expected,
        "decoding texture"
    );

    let mut data = vec![0u8; expected];
    reader.read_exact(&mut data).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => TextureError::TruncatedStream { expected },
        _ => TextureError::IO(e),
    })?;

    let pixels = match info.format {
        TextureFormat::Dxt1 => decode_blocks::<Dxt1Block>(&data, w, h),
        TextureFormat::Dxt3 => decode_blocks::<Dxt3Block>(&data, w, h),
        TextureFormat::Dxt5 => decode_blocks::<Dxt5Block>(&data, w, h),
        TextureFormat::Indexed4 => indexed::decode_4bpp(&data, info.palette_for(16)?, w, h)?,
        TextureFormat::Indexed8 => indexed::decode_8bpp(&data, info.palette_for(256)?, w, h)?,
        TextureFormat::Unsupported(tag) => return Err(TextureError::UnsupportedFormat { tag }),
    };

    Ok(Rgba32FImage::from_raw(info.width, info.height, pixels)
        .expect("pixel buffer matches the declared dimensions"))
}

/// Encode `image` into `writer` in the descriptor's format. Writes exactly
/// the surface's byte length in one pass; the caller guarantees the
/// destination region already has that size.
pub fn encode(
    image: &Rgba32FImage,
    writer: &mut impl Write,
    info: &TextureInfo,
) -> TextureResult {
    if image.width() != info.width || image.height() != info.height {
        return Err(TextureError::ShapeMismatch {
            width: info.width,
            height: info.height,
            found_width: image.width(),
            found_height: image.height(),
        });
    }

    let expected = info.validate()?;
    let (w, h) = (info.width as usize, info.height as usize);

    debug!(
        format = %info.format,
        width = info.width,
        height = info.height,
        bytes = expected,
        "encoding texture"
    );

    let pixels = image.as_raw().as_slice();
    let data = match info.format {
        TextureFormat::Dxt1 => encode_blocks::<Dxt1Block>(pixels, w, h),
        TextureFormat::Dxt3 => encode_blocks::<Dxt3Block>(pixels, w, h),
        TextureFormat::Dxt5 => encode_blocks::<Dxt5Block>(pixels, w, h),
        TextureFormat::Indexed4 => indexed::encode_4bpp(pixels, info.palette_for(16)?, w, h)?,
        TextureFormat::Indexed8 => indexed::encode_8bpp(pixels, info.palette_for(256)?, w, h)?,
        TextureFormat::Unsupported(tag) => return Err(TextureError::UnsupportedFormat { tag }),
    };
    debug_assert_eq!(data.len(), expected);

    writer.write_all(&data)?;
    Ok(())
}

/// Decode a block-compressed payload into raw RGBA f32 pixels. Block rows
/// are independent, so each band of four image rows decodes in parallel.
fn decode_blocks<B: Block>(data: &[u8], width: usize, height: usize) -> Vec<f32> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let blocks_width = (width + 3) / 4;
    let row_bytes = blocks_width * B::SIZE;
    let band_floats = width * 4 * 4; // four image rows per block row

    let mut pixels = vec![0.0f32; width * height * 4];
    pixels
        .par_chunks_mut(band_floats)
        .zip(data.par_chunks(row_bytes))
        .for_each(|(band, row_data)| {
            let band_rows = band.len() / (width * 4);
            for (bx, block) in row_data.chunks_exact(B::SIZE).enumerate() {
                let bytes: B::Bytes = block
                    .try_into()
                    .ok()
                    .expect("chunk length matches block size");
                let tile = B::from_bytes(&bytes).decode();

                // texels past the declared bounds are stored but ignored
                for row in 0..band_rows.min(Tile::HEIGHT) {
                    for col in 0..Tile::WIDTH {
                        let x = bx * 4 + col;
                        if x >= width {
                            continue;
                        }
                        let texel = tile.get(row, col);
                        let offset = (row * width + x) * 4;
                        band[offset..offset + 4].copy_from_slice(&[
                            *texel.r(),
                            *texel.g(),
                            *texel.b(),
                            *texel.a(),
                        ]);
                    }
                }
            }
        });
    pixels
}

/// Encode raw RGBA f32 pixels as block-compressed data. The padding texels
/// of partial edge tiles replicate the nearest in-bounds pixel.
fn encode_blocks<B: Block>(pixels: &[f32], width: usize, height: usize) -> Vec<u8> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let blocks_width = (width + 3) / 4;
    let blocks_height = (height + 3) / 4;
    let row_bytes = blocks_width * B::SIZE;
    let band_floats = width * 4 * 4;

    let mut data = vec![0u8; blocks_height * row_bytes];
    data.par_chunks_mut(row_bytes)
        .zip(pixels.par_chunks(band_floats))
        .for_each(|(row_data, band)| {
            let band_rows = band.len() / (width * 4);
            for (bx, block) in row_data.chunks_exact_mut(B::SIZE).enumerate() {
                let tile = Tile::from_fn(|row, col| {
                    let row = row.min(band_rows - 1);
                    let x = (bx * 4 + col).min(width - 1);
                    let offset = (row * width + x) * 4;
                    Texel::rgba(
                        band[offset],
                        band[offset + 1],
                        band[offset + 2],
                        band[offset + 3],
                    )
                });
                block.copy_from_slice(B::encode(&tile).to_bytes().as_ref());
            }
        });
    data
}
