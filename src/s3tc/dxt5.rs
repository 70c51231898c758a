// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use bitvec::prelude::*;
use itertools::Itertools;
use vector_victor::Matrix;

use crate::color::Channel;
use crate::fit::{fit_endpoints, quantize};
use crate::pack::{Pack, Unpack};
use crate::s3tc::{Block, Dxt1Block};
use crate::tile::Tile;

/// The interpolated alpha plane of a DXT5 block: two 8-bit endpoints and a
/// 4x4 grid of 3-bit ramp indices.
///
/// Like the color endpoints of [`Dxt1Block`], the numeric order of `a0`/`a1`
/// selects the ramp mode: `a0 > a1` yields a fully interpolated 8-value
/// ramp, otherwise a 6-value ramp whose last two entries are forced to
/// 0.0 and 1.0.
#[derive(Copy, Clone)]
pub struct AlphaRamp {
    pub a0: u8,
    pub a1: u8,
    codes: Matrix<u8, 4, 4>,
}

impl AlphaRamp {
    /// The 8-entry lookup ramp selected by the endpoint ordering.
    pub fn ramp(&self) -> [Channel; 8] {
        let a0 = self.a0 as Channel / 255.0;
        let a1 = self.a1 as Channel / 255.0;
        let lerp = |t: f32| a0 + t * (a1 - a0);

        if self.a0 > self.a1 {
            [
                a0,
                a1,
                lerp(1.0 / 7.0),
                lerp(2.0 / 7.0),
                lerp(3.0 / 7.0),
                lerp(4.0 / 7.0),
                lerp(5.0 / 7.0),
                lerp(6.0 / 7.0),
            ]
        } else {
            [
                a0,
                a1,
                lerp(1.0 / 5.0),
                lerp(2.0 / 5.0),
                lerp(3.0 / 5.0),
                lerp(4.0 / 5.0),
                0.0,
                1.0,
            ]
        }
    }

    fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0] = self.a0;
        bytes[1] = self.a1;

        // 48-bit little-endian index plane, 3 bits per pixel in raster order
        let bits = bytes[2..8].view_bits_mut::<Lsb0>();
        bits.chunks_mut(3)
            .pack_le(self.codes.rows().flat_map(|row| (0..4).map(move |c| row[c])));

        bytes
    }

    fn from_bytes(bytes: &[u8; 8]) -> Self {
        let bits = bytes[2..8].view_bits::<Lsb0>();
        let codes = Matrix::<u8, 4, 4>::from_rows(
            bits.chunks(12).map(|row| row.chunks(3).unpack_le().collect()),
        );

        Self {
            a0: bytes[0],
            a1: bytes[1],
            codes,
        }
    }

    fn decode(&self) -> [Channel; 16] {
        let ramp = self.ramp();
        let mut alphas = [0.0; 16];
        for (row, codes) in self.codes.rows().enumerate() {
            for col in 0..4 {
                alphas[row * 4 + col] = ramp[codes[col] as usize];
            }
        }
        alphas
    }

    fn encode(alphas: &[Channel; 16]) -> Self {
        // exact 0.0/1.0 samples are served by the forced ramp entries, so
        // they never contribute to the fit
        let interior = alphas
            .iter()
            .map(|a| quantize(*a, 255.0))
            .filter(|a| *a != 0.0 && *a != 1.0);
        let (lo, hi) = fit_endpoints(interior).unwrap_or((254.0 / 255.0, 1.0));

        let mut lo = lo.clamp(0.0, 1.0);
        let mut hi = hi.clamp(0.0, 1.0);
        let alpha0 = (lo * 255.0) as u8;
        let alpha1 = (hi * 255.0) as u8;

        let has_extremes = alphas.iter().any(|a| *a == 0.0 || *a == 1.0);
        let ramp: [Channel; 8] = if has_extremes {
            // 6-value mode: written order must be a0 <= a1
            if alpha0 > alpha1 {
                std::mem::swap(&mut lo, &mut hi);
            }
            let lerp = |t: f32| lo + t * (hi - lo);
            [
                lo,
                hi,
                lerp(1.0 / 5.0),
                lerp(2.0 / 5.0),
                lerp(3.0 / 5.0),
                lerp(4.0 / 5.0),
                0.0,
                1.0,
            ]
        } else {
            // 8-value mode: written order must be a0 > a1; equal endpoints
            // break the tie by stepping the second one down
            if alpha0 < alpha1 {
                std::mem::swap(&mut lo, &mut hi);
            } else if alpha0 == alpha1 {
                hi = alpha1.saturating_sub(1) as Channel / 255.0;
            }
            let lerp = |t: f32| lo + t * (hi - lo);
            [
                lo,
                hi,
                lerp(1.0 / 7.0),
                lerp(2.0 / 7.0),
                lerp(3.0 / 7.0),
                lerp(4.0 / 7.0),
                lerp(5.0 / 7.0),
                lerp(6.0 / 7.0),
            ]
        };

        let codes = Matrix::<u8, 4, 4>::from_rows(alphas.chunks(4).map(|row| {
            row.iter()
                .map(|a| {
                    ramp.iter()
                        .map(|r| (a - r).abs())
                        .position_min_by(f32::total_cmp)
                        .expect("ramp is never empty") as u8
                })
                .collect()
        }));

        Self {
            a0: (ramp[0] * 255.0) as u8,
            a1: (ramp[1] * 255.0) as u8,
            codes,
        }
    }
}

/// A DXT5 block: the interpolated alpha plane followed by a DXT1 color
/// block.
#[derive(Copy, Clone)]
pub struct Dxt5Block {
    alpha: AlphaRamp,
    color: Dxt1Block,
}

impl Block for Dxt5Block {
    type Bytes = [u8; 16];
    const SIZE: usize = 16;

    fn to_bytes(&self) -> Self::Bytes {
        let mut bytes: Self::Bytes = [0; 16];
        bytes[0..8].copy_from_slice(&self.alpha.to_bytes());
        bytes[8..16].copy_from_slice(&self.color.to_bytes());
        bytes
    }

    fn from_bytes(bytes: &Self::Bytes) -> Self {
        Self {
            alpha: AlphaRamp::from_bytes(&<[u8; 8]>::try_from(&bytes[0..8]).unwrap()),
            color: Dxt1Block::from_bytes(&<[u8; 8]>::try_from(&bytes[8..16]).unwrap()),
        }
    }

    fn decode(&self) -> Tile {
        self.color.decode().with_alphas(&self.alpha.decode())
    }

    fn encode(tile: &Tile) -> Self {
        Self {
            alpha: AlphaRamp::encode(&tile.alphas()),
            color: Dxt1Block::encode(&tile.opaque()),
        }
    }
}
