// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("unsupported texture format tag {tag:#06x}")]
    UnsupportedFormat { tag: u32 },

    #[error("texture data truncated: format requires {expected} bytes")]
    TruncatedStream { expected: usize },

    #[error("palette index {index} out of range for a palette of {len} colors")]
    PaletteIndexOutOfRange { index: usize, len: usize },

    #[error("palette has {found} colors where {expected} are required")]
    InvalidPaletteSize { expected: usize, found: usize },

    #[error("4bpp indexed textures require an even width, got {width}")]
    OddWidth { width: u32 },

    #[error("image buffer is {found_width}x{found_height} but the descriptor says {width}x{height}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },

    #[error("IO error in texture stream: {0}")]
    IO(#[from] std::io::Error),
}

pub type TextureResult<T = ()> = Result<T, TextureError>;
