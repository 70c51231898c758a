// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use bitvec::prelude::*;
use vector_victor::Matrix;

use crate::color::Channel;
use crate::pack::{Pack, Unpack};
use crate::s3tc::{Block, Dxt1Block};
use crate::tile::Tile;

/// The fixed 4-bit alpha plane of a DXT3 block: 16 nibbles in raster order,
/// two per byte with the low nibble first.
#[derive(Copy, Clone)]
pub struct AlphaFourBit {
    nibbles: Matrix<u8, 4, 4>,
}

impl AlphaFourBit {
    fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        let bits = bytes.view_bits_mut::<Lsb0>();
        bits.chunks_mut(4)
            .pack_le(self.nibbles.rows().flat_map(|row| (0..4).map(move |c| row[c])));
        bytes
    }

    fn from_bytes(bytes: &[u8; 8]) -> Self {
        let bits = bytes.view_bits::<Lsb0>();
        let nibbles = Matrix::<u8, 4, 4>::from_rows(
            bits.chunks(16).map(|row| row.chunks(4).unpack_le().collect()),
        );
        Self { nibbles }
    }

    fn decode(&self) -> [Channel; 16] {
        let mut alphas = [0.0; 16];
        for (row, nibbles) in self.nibbles.rows().enumerate() {
            for col in 0..4 {
                alphas[row * 4 + col] = nibbles[col] as Channel / 15.0;
            }
        }
        alphas
    }

    fn encode(alphas: &[Channel; 16]) -> Self {
        let nibbles = Matrix::<u8, 4, 4>::from_rows(alphas.chunks(4).map(|row| {
            row.iter()
                .map(|a| (a * 15.0 + 0.5).floor().clamp(0.0, 15.0) as u8)
                .collect()
        }));
        Self { nibbles }
    }
}

/// A DXT3 block: the 4-bit alpha plane followed by a DXT1 color block.
/// The two planes are independent and simply concatenated.
#[derive(Copy, Clone)]
pub struct Dxt3Block {
    alpha: AlphaFourBit,
    color: Dxt1Block,
}

impl Block for Dxt3Block {
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
            alpha: AlphaFourBit::from_bytes(&<[u8; 8]>::try_from(&bytes[0..8]).unwrap()),
            color: Dxt1Block::from_bytes(&<[u8; 8]>::try_from(&bytes[8..16]).unwrap()),
        }
    }

    fn decode(&self) -> Tile {
        self.color.decode().with_alphas(&self.alpha.decode())
    }

    fn encode(tile: &Tile) -> Self {
        Self {
            alpha: AlphaFourBit::encode(&tile.alphas()),
            color: Dxt1Block::encode(&tile.opaque()),
        }
    }
}
