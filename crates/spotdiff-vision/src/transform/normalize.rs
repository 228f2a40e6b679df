// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour normalisation — per-channel histogram equalisation to even out
// uneven lighting across the photographed page.

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::contrast::equalize_histogram;
use spotdiff_core::error::Result;
use tracing::{debug, instrument};

use crate::raster::unsupported_layout;

/// Equalise contrast.
///
/// Grayscale images are equalised directly. Colour images lose their alpha
/// channel, and R, G and B are equalised independently before being
/// recombined as RGB. Independent channels can shift colour balance on
/// saturated photos; that is the intended behaviour.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn normalize(image: &DynamicImage) -> Result<DynamicImage> {
    let normalized = match image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(equalize_histogram(gray)),
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(equalize_channels(rgb)),
        DynamicImage::ImageRgba8(_) => {
            debug!("Dropping alpha before equalisation");
            DynamicImage::ImageRgb8(equalize_channels(&image.to_rgb8()))
        }
        other => return Err(unsupported_layout(other)),
    };
    debug!(color = ?normalized.color(), "Histogram equalisation complete");
    Ok(normalized)
}

/// Split into R, G, B planes, equalise each, and merge.
fn equalize_channels(rgb: &RgbImage) -> RgbImage {
    let (width, height) = rgb.dimensions();
    let planes: [GrayImage; 3] = std::array::from_fn(|c| {
        let plane = GrayImage::from_fn(width, height, |x, y| image::Luma([rgb.get_pixel(x, y).0[c]]));
        equalize_histogram(&plane)
    });
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            planes[0].get_pixel(x, y).0[0],
            planes[1].get_pixel(x, y).0[0],
            planes[2].get_pixel(x, y).0[0],
        ])
    })
}
