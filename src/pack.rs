// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::iter::{zip, Map};

use bitvec::field::BitField;
use bitvec::prelude::*;
use funty::Integral;

/// Store a stream of small integers into an iterator of bit-slice chunks,
/// one value per chunk. Used for the 2/3/4-bit index planes of the block
/// formats: with an `Lsb0` view over the wire bytes, chunk `k` is exactly
/// pixel `k`'s field in the little-endian bit stream.
pub trait Pack: IntoIterator {
    fn pack_le<V: Integral + Into<u64>, U: IntoIterator<Item = V>>(self, unpacked: U);
}

impl<'a, T: BitStore, O: BitOrder, I> Pack for I
where
    I: IntoIterator<Item = &'a mut BitSlice<T, O>>,
    BitSlice<T, O>: BitField,
{
    fn pack_le<V: Integral + Into<u64>, U: IntoIterator<Item = V>>(self, unpacked: U) {
        for (src, dst) in zip(unpacked, self) {
            debug_assert!(
                Into::<u64>::into(src) < (1u64 << dst.len()),
                "Input value {:X} cannot be packed into {} bits",
                src,
                dst.len()
            );
            dst.store_le(src);
        }
    }
}

/// The inverse of [`Pack`]: load one value per bit-slice chunk.
pub trait Unpack: IntoIterator + Sized {
    fn unpack_le<V: Integral>(
        self,
    ) -> Map<<Self as IntoIterator>::IntoIter, fn(<Self as IntoIterator>::Item) -> V>;
}

impl<'a, T: BitStore, O: BitOrder, I> Unpack for I
where
    I: IntoIterator<Item = &'a BitSlice<T, O>>,
    BitSlice<T, O>: BitField,
{
    fn unpack_le<V: Integral>(
        self,
    ) -> Map<<Self as IntoIterator>::IntoIter, fn(<Self as IntoIterator>::Item) -> V> {
        self.into_iter().map(|b| b.load_le())
    }
}
