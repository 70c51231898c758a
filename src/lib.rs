// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Codecs for the texture formats found in NU-engine game containers:
//! DXT1/DXT3/DXT5 block compression and 4/8-bit palette-indexed pixels.
//!
//! The [`codec`] module is the entry point: it dispatches on a
//! [`codec::TextureFormat`] tag and converts between positioned byte streams
//! and [`image::Rgba32FImage`] buffers. Everything below it (tile codecs,
//! endpoint fitting, palette handling) is public for callers that need to
//! work a block at a time.

pub mod codec;
pub mod color;
pub mod error;
pub mod fit;
pub mod indexed;
pub mod pack;
pub mod s3tc;
pub mod tile;
