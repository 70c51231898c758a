// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed interleave permutation used by 256-entry palettes on one
//! console platform family.
//!
//! On disk the 256 entries are grouped into 8 parts of 32, each part into
//! 2 blocks of 16, each block into 2 stripes of 8. Linear index order
//! iterates part, block, stripe, color; the stored order swaps the block and
//! stripe strides. The permutation swaps two index bits, so applying it
//! twice is the identity.

const PARTS: usize = 8;
const BLOCKS: usize = 2;
const STRIPES: usize = 2;
const COLORS: usize = 8;

/// For each linear palette index, the offset of its entry in the stored
/// (interleaved) order.
pub fn defilter_table() -> [usize; 256] {
    let mut table = [0usize; 256];
    let mut i = 0;
    for part in 0..PARTS {
        for block in 0..BLOCKS {
            for stripe in 0..STRIPES {
                for color in 0..COLORS {
                    table[i] = part * COLORS * STRIPES * BLOCKS
                        + block * COLORS
                        + stripe * STRIPES * COLORS
                        + color;
                    i += 1;
                }
            }
        }
    }
    table
}
