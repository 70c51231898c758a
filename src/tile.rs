// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::color::{Channel, Texel, TexelImpl};

/// One 4x4 tile of texels in raster order (row-major, left to right).
/// Tiles exist only transiently while a block is encoded or decoded.
#[derive(Copy, Clone)]
pub struct Tile {
    texels: [Texel; 16],
}

impl Tile {
    pub const WIDTH: usize = 4;
    pub const HEIGHT: usize = 4;

    pub fn from_fn(mut f: impl FnMut(usize, usize) -> Texel) -> Self {
        let mut texels = [Texel::transparent(); 16];
        for row in 0..Self::HEIGHT {
            for col in 0..Self::WIDTH {
                texels[row * Self::WIDTH + col] = f(row, col);
            }
        }
        Self { texels }
    }

    pub fn filled(texel: Texel) -> Self {
        Self { texels: [texel; 16] }
    }

    pub fn get(&self, row: usize, col: usize) -> Texel {
        self.texels[row * Self::WIDTH + col]
    }

    pub fn set(&mut self, row: usize, col: usize, texel: Texel) {
        self.texels[row * Self::WIDTH + col] = texel;
    }

    /// All 16 texels in raster order.
    pub fn texels(&self) -> &[Texel; 16] {
        &self.texels
    }

    /// The alpha plane in raster order.
    pub fn alphas(&self) -> [Channel; 16] {
        let mut alphas = [0.0; 16];
        for (a, t) in alphas.iter_mut().zip(&self.texels) {
            *a = *t.a();
        }
        alphas
    }

    /// The same tile with each texel's alpha replaced from `alphas`.
    pub fn with_alphas(&self, alphas: &[Channel; 16]) -> Self {
        let mut texels = self.texels;
        for (t, a) in texels.iter_mut().zip(alphas) {
            *t = t.with_alpha(*a);
        }
        Self { texels }
    }

    /// The same tile with every alpha forced to 1.0. The composed formats
    /// carry alpha in their own plane, so their color block is fitted as if
    /// fully opaque.
    pub fn opaque(&self) -> Self {
        let mut texels = self.texels;
        for t in texels.iter_mut() {
            *t = t.with_alpha(1.0);
        }
        Self { texels }
    }
}
