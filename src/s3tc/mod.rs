// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::tile::Tile;

pub mod dxt1;
pub mod dxt3;
pub mod dxt5;

pub use dxt1::Dxt1Block;
pub use dxt3::Dxt3Block;
pub use dxt5::Dxt5Block;

/// One wire-format block covering a 4x4 tile.
///
/// `to_bytes`/`from_bytes` are the lossless wire representation;
/// `decode`/`encode` are the (lossy, for encode) conversions between a block
/// and its tile of texels.
pub trait Block: Sized {
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>; // = [u8; 8], etc.
    const SIZE: usize;
    const WIDTH: usize = 4;
    const HEIGHT: usize = 4;

    fn to_bytes(&self) -> Self::Bytes;
    fn from_bytes(bytes: &Self::Bytes) -> Self;

    fn decode(&self) -> Tile;
    fn encode(tile: &Tile) -> Self;
}

/// Number of blocks needed to cover `width` x `height` pixels. Partial tiles
/// at the right/bottom edges still occupy a full block.
pub fn block_count(width: usize, height: usize) -> usize {
    let blocks_width = (width + 3) / 4;
    let blocks_height = (height + 3) / 4;
    blocks_width * blocks_height
}
