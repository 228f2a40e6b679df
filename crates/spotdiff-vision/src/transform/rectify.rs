// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warps the page quadrilateral onto an upright
// rectangle sized from the page's own edge lengths.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use spotdiff_core::error::{Result, SpotDiffError};
use spotdiff_core::geometry::distance;
use spotdiff_core::OrderedCorners;
use tracing::{debug, info, instrument};

use crate::raster::unsupported_layout;

/// Flatten the page bounded by `corners`, filling pixels that fall outside
/// the photo with black.
pub fn rectify(image: &DynamicImage, corners: &OrderedCorners) -> Result<DynamicImage> {
    rectify_with_background(image, corners, [0, 0, 0])
}

/// Flatten the page bounded by `corners`.
///
/// ## Pipeline
///
/// 1. Target width is the longer of the top and bottom edges, target height
///    the longer of the left and right edges, so a skewed page is never
///    cropped
/// 2. Destination rectangle `(0,0) (w-1,0) (w-1,h-1) (0,h-1)`, same corner
///    order as the source
/// 3. Projective transform from the four correspondences
/// 4. Bilinear resampling into a fresh `ceil(w) x ceil(h)` buffer; pixels whose
///    pre-image lies outside the photo get `background` (opaque for RGBA)
///
/// Fails with `DegenerateGeometry` when either target dimension rounds to
/// zero or the corners admit no projective mapping.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rectify_with_background(
    image: &DynamicImage,
    corners: &OrderedCorners,
    background: [u8; 3],
) -> Result<DynamicImage> {
    let (target_w, target_h) = target_size(corners);
    debug!(target_w, target_h, "Target rectangle computed");

    if target_w.round() < 1.0 || target_h.round() < 1.0 {
        return Err(SpotDiffError::DegenerateGeometry {
            width: target_w,
            height: target_h,
        });
    }

    let projection = page_projection(corners, target_w, target_h)?;
    let out_w = (target_w.ceil() as u32).max(1);
    let out_h = (target_h.ceil() as u32).max(1);
    let [r, g, b] = background;

    let warped = match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(out_w, out_h);
            warp_into(gray, &projection, Interpolation::Bilinear, Luma([luma(background)]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageRgb8(rgb) => {
            let mut out = RgbImage::new(out_w, out_h);
            warp_into(rgb, &projection, Interpolation::Bilinear, Rgb([r, g, b]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
        DynamicImage::ImageRgba8(rgba) => {
            let mut out = RgbaImage::new(out_w, out_h);
            warp_into(rgba, &projection, Interpolation::Bilinear, Rgba([r, g, b, 255]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
        other => return Err(unsupported_layout(other)),
    };

    info!(out_w, out_h, "Perspective correction applied");
    Ok(warped)
}

/// `(width, height)` of the rectified page: the longer of each pair of
/// opposite edges.
pub fn target_size(corners: &OrderedCorners) -> (f32, f32) {
    let width_bottom = distance(corners.bottom_right, corners.bottom_left);
    let width_top = distance(corners.top_right, corners.top_left);
    let height_right = distance(corners.top_right, corners.bottom_right);
    let height_left = distance(corners.top_left, corners.bottom_left);
    (width_bottom.max(width_top), height_right.max(height_left))
}

/// Projective mapping from the photo's page corners to the upright
/// `target_w x target_h` rectangle.
pub fn page_projection(corners: &OrderedCorners, target_w: f32, target_h: f32) -> Result<Projection> {
    let src = corners.to_array().map(|p| p.to_tuple());
    let dest = [
        (0.0, 0.0),
        (target_w - 1.0, 0.0),
        (target_w - 1.0, target_h - 1.0),
        (0.0, target_h - 1.0),
    ];
    Projection::from_control_points(src, dest).ok_or(SpotDiffError::DegenerateGeometry {
        width: target_w,
        height: target_h,
    })
}

fn luma([r, g, b]: [u8; 3]) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}
