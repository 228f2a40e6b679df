// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bisection — cuts the rectified puzzle into its left and right panels.

use image::DynamicImage;
use spotdiff_core::error::Result;
use tracing::debug;

use crate::raster::encode_png;

/// The two puzzle panels. Both are owned buffers, independent of the image
/// they were cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePair {
    pub left: DynamicImage,
    pub right: DynamicImage,
}

impl ImagePair {
    /// Encode both halves as PNG, `(left, right)`.
    pub fn to_png_bytes(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        Ok((encode_png(&self.left)?, encode_png(&self.right)?))
    }
}

/// Split at `floor(width / 2)`: the left half gets columns `[0, mid)`, the
/// right half `[mid, width)`, so an odd column goes right. A one-pixel-wide
/// image yields an empty left half.
pub fn split(image: &DynamicImage) -> ImagePair {
    let (width, height) = (image.width(), image.height());
    let mid = width / 2;
    debug!(width, height, mid, "Splitting into left/right halves");
    ImagePair {
        left: image.crop_imm(0, 0, mid, height),
        right: image.crop_imm(mid, 0, width - mid, height),
    }
}
