// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use arrayvec::ArrayVec;
use bitvec::prelude::*;
use itertools::Itertools;
use vector_victor::Matrix;

use crate::color::{Texel, TexelImpl};
use crate::fit::{fit_endpoints, quantize};
use crate::pack::{Pack, Unpack};
use crate::s3tc::Block;
use crate::tile::Tile;

/// Alpha at or below this threshold is treated as punch-through transparent:
/// excluded from color fitting and forced onto palette index 3.
pub const OPAQUE_THRESHOLD: f32 = 0.5;

/// A DXT1 color block: two packed RGB565 endpoints and a 4x4 grid of 2-bit
/// palette indices.
///
/// The numeric order of the raw endpoints is part of the wire format: if
/// `endpoints[0] > endpoints[1]` the block decodes in four-color mode,
/// otherwise in punch-through mode where index 3 is transparent black.
#[derive(Copy, Clone)]
pub struct Dxt1Block {
    pub endpoints: [u16; 2],
    codes: Matrix<u8, 4, 4>,
}

impl Dxt1Block {
    /// Derive the 4-entry palette selected by the endpoint ordering.
    pub fn palette(&self) -> [Texel; 4] {
        let [c0, c1] = self.endpoints;
        let color0 = Texel::from_565(c0);
        let color1 = Texel::from_565(c1);

        if c0 > c1 {
            let third = color0.lerp(&color1, 1.0 / 3.0);
            let two_thirds = color1.lerp(&color0, 1.0 / 3.0);
            [color0, color1, third, two_thirds]
        } else {
            let mid = color0.lerp(&color1, 0.5);
            [color0, color1, mid, Texel::transparent()]
        }
    }
}

impl Block for Dxt1Block {
    type Bytes = [u8; 8];
    const SIZE: usize = 8;

    fn to_bytes(&self) -> Self::Bytes {
        let mut bytes: Self::Bytes = [0; 8];

        bytes[0..2].copy_from_slice(&self.endpoints[0].to_le_bytes());
        bytes[2..4].copy_from_slice(&self.endpoints[1].to_le_bytes());

        // 2 bits per pixel, raster order from the low bits of each byte up
        let bits = bytes[4..8].view_bits_mut::<Lsb0>();
        bits.chunks_mut(2)
            .pack_le(self.codes.rows().flat_map(|row| (0..4).map(move |c| row[c])));

        bytes
    }

    fn from_bytes(bytes: &Self::Bytes) -> Self {
        let color0 = u16::from_le_bytes([bytes[0], bytes[1]]);
        let color1 = u16::from_le_bytes([bytes[2], bytes[3]]);

        let bits = bytes[4..8].view_bits::<Lsb0>();
        let codes = Matrix::<u8, 4, 4>::from_rows(
            bits.chunks(8).map(|row| row.chunks(2).unpack_le().collect()),
        );

        Self {
            endpoints: [color0, color1],
            codes,
        }
    }

    fn decode(&self) -> Tile {
        let palette = self.palette();
        let mut tile = Tile::filled(Texel::transparent());
        for (row, codes) in self.codes.rows().enumerate() {
            for col in 0..4 {
                tile.set(row, col, palette[codes[col] as usize]);
            }
        }
        tile
    }

    fn encode(tile: &Tile) -> Self {
        let opaque: ArrayVec<Texel, 16> = tile
            .texels()
            .iter()
            .copied()
            .filter(|t| *t.a() > OPAQUE_THRESHOLD)
            .collect();

        let fit_channel = |channel: fn(&Texel) -> f32, steps: f32| {
            fit_endpoints(opaque.iter().map(|t| quantize(channel(t), steps)))
                .unwrap_or((0.0, 0.0))
        };

        let (r_lo, r_hi) = fit_channel(|t| *t.r(), 31.0);
        let (g_lo, g_hi) = fit_channel(|t| *t.g(), 63.0);
        let (b_lo, b_hi) = fit_channel(|t| *t.b(), 31.0);

        let mut lo = Texel::rgba(r_lo, g_lo, b_lo, 1.0);
        let mut hi = Texel::rgba(r_hi, g_hi, b_hi, 1.0);
        let mid = lo.lerp(&hi, 0.5);

        // punch-through ordering (c0 <= c1), so that the indices forced to 3
        // below actually decode as transparent
        if lo.to_565() > hi.to_565() {
            std::mem::swap(&mut lo, &mut hi);
        }

        let palette = [lo, hi, mid];
        let codes = Matrix::<u8, 4, 4>::from_rows(tile.texels().chunks(4).map(|row| {
            row.iter()
                .map(|texel| {
                    if *texel.a() > OPAQUE_THRESHOLD {
                        palette
                            .iter()
                            .map(|p| texel.rgb_distance(p))
                            .position_min_by(f32::total_cmp)
                            .expect("palette is never empty") as u8
                    } else {
                        3u8
                    }
                })
                .collect()
        }));

        Self {
            endpoints: [lo.to_565(), hi.to_565()],
            codes,
        }
    }
}
