// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster boundary — channel-layout checks, raw buffer import, and the
// decode/encode helpers that collaborators use to get images in and out of
// the pipeline.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use spotdiff_core::error::{Result, SpotDiffError};
use spotdiff_core::ChannelLayout;
use tracing::{debug, instrument};

/// Classify an image's pixel layout, rejecting anything the pipeline does
/// not process (two-channel, 16-bit and float buffers).
pub fn channel_layout(image: &DynamicImage) -> Result<ChannelLayout> {
    match image {
        DynamicImage::ImageLuma8(_) => Ok(ChannelLayout::Gray),
        DynamicImage::ImageRgb8(_) => Ok(ChannelLayout::Rgb),
        DynamicImage::ImageRgba8(_) => Ok(ChannelLayout::Rgba),
        other => Err(unsupported_layout(other)),
    }
}

/// Error describing why `image` cannot enter the pipeline.
pub(crate) fn unsupported_layout(image: &DynamicImage) -> SpotDiffError {
    let color = image.color();
    SpotDiffError::UnsupportedChannelLayout(format!(
        "{:?} ({} channels, {} bytes per pixel)",
        color,
        color.channel_count(),
        color.bytes_per_pixel()
    ))
}

/// Wrap a row-major, top-left-origin sample buffer as an image.
///
/// `channels` must be 1 (gray), 3 (RGB) or 4 (RGBA) and `pixels` must hold
/// exactly `width * height * channels` samples. RGBA canvas data can be
/// passed straight through.
pub fn from_raw_parts(
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
) -> Result<DynamicImage> {
    let layout = ChannelLayout::from_channel_count(channels)?;
    let actual = pixels.len();
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or(SpotDiffError::BufferSizeMismatch {
            expected: usize::MAX,
            actual,
        })?;
    if actual != expected {
        return Err(SpotDiffError::BufferSizeMismatch { expected, actual });
    }

    let image = match layout {
        ChannelLayout::Gray => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        ChannelLayout::Rgb => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        ChannelLayout::Rgba => RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
    };
    image.ok_or(SpotDiffError::BufferSizeMismatch { expected, actual })
}

/// Decode an encoded photo (JPEG, PNG, ...) into a supported layout.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| SpotDiffError::Decode(format!("failed to decode photo: {}", err)))?;
    debug!(
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Photo decoded from bytes"
    );
    Ok(into_supported_layout(image))
}

/// Open a photo from disk. The format is inferred from the content.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<std::path::Path>) -> Result<DynamicImage> {
    let image = image::open(path.as_ref()).map_err(|err| {
        SpotDiffError::Decode(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            err
        ))
    })?;
    Ok(into_supported_layout(image))
}

/// Convert exotic decoder output (gray+alpha, 16-bit, float) into the
/// nearest 8-bit layout the pipeline handles. Supported layouts pass through
/// untouched.
pub fn into_supported_layout(image: DynamicImage) -> DynamicImage {
    if channel_layout(&image).is_ok() {
        return image;
    }
    let color = image.color();
    if color.has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else if color.has_color() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageLuma8(image.to_luma8())
    }
}

/// Encode an image as PNG bytes for display.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| SpotDiffError::Encode(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}
