// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge contours — grayscale conversion, fixed Gaussian denoising, Canny edge
// detection and outer-border tracing.

use image::{DynamicImage, GrayImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::point::Point as PixelPoint;
use spotdiff_core::config::DEFAULT_BLUR_KERNEL_SIZE;
use spotdiff_core::error::{Result, SpotDiffError};
use spotdiff_core::{Contour, Point};
use tracing::{debug, instrument};

use crate::raster::channel_layout;

/// Extract the outermost boundaries of connected edge regions.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. 5x5 Gaussian blur (sigma derived from the kernel size)
/// 3. Canny edge detection with `canny_low` / `canny_high` hysteresis
/// 4. Border following, keeping outer borders that have no enclosing border
/// 5. Chain compression: runs of points along one step direction collapse to
///    their end points
///
/// The input image is only read. An image with no pixels has no contours.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn extract_contours(image: &DynamicImage, canny_low: f32, canny_high: f32) -> Result<Vec<Contour>> {
    if canny_low.is_nan() || canny_high.is_nan() || canny_low > canny_high {
        return Err(SpotDiffError::InvalidConfig(format!(
            "Canny low threshold {canny_low} exceeds high threshold {canny_high}"
        )));
    }
    channel_layout(image)?;
    if has_no_pixels(image) {
        debug!("Empty image; nothing to trace");
        return Ok(Vec::new());
    }
    let blurred = denoised_gray(image, DEFAULT_BLUR_KERNEL_SIZE)?;
    Ok(contours_from_blurred(&blurred, canny_low, canny_high))
}

/// Zero width or zero height. Canny cannot run on such an image.
pub(crate) fn has_no_pixels(image: &DynamicImage) -> bool {
    image.width() == 0 || image.height() == 0
}

/// Grayscale + Gaussian blur. Shared by every threshold pass of the detector
/// so the blur runs once per photo.
pub(crate) fn denoised_gray(image: &DynamicImage, kernel_size: u32) -> Result<GrayImage> {
    channel_layout(image)?;
    let gray = image.to_luma8();
    let kernel = gaussian_kernel(kernel_size);
    debug!(kernel_size, "Applying Gaussian blur");
    Ok(separable_filter_equal(&gray, &kernel))
}

/// Steps 3–5 of [`extract_contours`] on an already denoised image.
pub(crate) fn contours_from_blurred(blurred: &GrayImage, canny_low: f32, canny_high: f32) -> Vec<Contour> {
    let edges = canny(blurred, canny_low, canny_high);
    let contours = trace_external(&edges);
    debug!(
        canny_low,
        canny_high,
        contours = contours.len(),
        "Edge contours traced"
    );
    contours
}

/// Trace outer borders of an edge map that are not nested inside another
/// border.
fn trace_external(edges: &GrayImage) -> Vec<Contour> {
    find_contours::<u32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(compress_chain(&c.points)))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Normalised 1-D Gaussian of odd length `size`.
///
/// Sigma follows the usual automatic rule `0.3 * ((size - 1) * 0.5 - 1) + 0.8`,
/// which gives 1.1 for the default 5-tap kernel.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let centre = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Collapse a closed pixel chain to its turning points.
///
/// A point is dropped when the step into it and the step out of it point in
/// the same direction. Chains shorter than three points are kept verbatim.
pub fn compress_chain(points: &[PixelPoint<u32>]) -> Vec<Point> {
    let to_point = |p: &PixelPoint<u32>| Point::new(p.x as f32, p.y as f32);
    let n = points.len();
    if n < 3 {
        return points.iter().map(to_point).collect();
    }

    let step = |from: &PixelPoint<u32>, to: &PixelPoint<u32>| {
        (
            (to.x as i64 - from.x as i64).signum(),
            (to.y as i64 - from.y as i64).signum(),
        )
    };

    let compressed: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = &points[(i + n - 1) % n];
            let next = &points[(i + 1) % n];
            step(prev, &points[i]) != step(&points[i], next)
        })
        .map(|i| to_point(&points[i]))
        .collect();

    if compressed.is_empty() {
        points.iter().map(to_point).collect()
    } else {
        compressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn filled_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(5);
        assert_eq!(kernel.len(), 5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!((kernel[1] - kernel[3]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);
    }

    #[test]
    fn compress_chain_keeps_square_corners() {
        // Pixel ring around a 4x4 square, clockwise from the top-left.
        let mut ring = Vec::new();
        for x in 0..4 {
            ring.push(PixelPoint::new(x, 0));
        }
        for y in 1..4 {
            ring.push(PixelPoint::new(3, y));
        }
        for x in (0..3).rev() {
            ring.push(PixelPoint::new(x, 3));
        }
        for y in (1..3).rev() {
            ring.push(PixelPoint::new(0, y));
        }
        let compressed = compress_chain(&ring);
        assert_eq!(
            compressed,
            vec![
                Point::new(0.0, 0.0),
                Point::new(3.0, 0.0),
                Point::new(3.0, 3.0),
                Point::new(0.0, 3.0),
            ]
        );
    }

    #[test]
    fn short_chains_are_kept() {
        let chain = [PixelPoint::new(2u32, 2u32), PixelPoint::new(3, 2)];
        assert_eq!(compress_chain(&chain).len(), 2);
    }

    #[test]
    fn uniform_image_has_no_contours() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 80, Luma([128u8])));
        let contours = extract_contours(&image, 30.0, 100.0).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn empty_images_have_no_contours() {
        for (w, h) in [(0u32, 0u32), (0, 10), (10, 0)] {
            let image = DynamicImage::ImageLuma8(GrayImage::new(w, h));
            assert!(extract_contours(&image, 30.0, 100.0).unwrap().is_empty());
        }
        let empty_gray_alpha = DynamicImage::ImageLumaA8(image::ImageBuffer::new(0, 0));
        assert!(extract_contours(&empty_gray_alpha, 30.0, 100.0).is_err());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(16, 16));
        assert!(matches!(
            extract_contours(&image, 150.0, 50.0),
            Err(SpotDiffError::InvalidConfig(_))
        ));
    }

    #[test]
    fn white_rectangle_yields_one_large_outer_contour() {
        let image = DynamicImage::ImageLuma8(filled_rect(200, 150, 40, 30, 160, 120));
        let contours = extract_contours(&image, 50.0, 150.0).unwrap();
        assert!(!contours.is_empty());

        let largest = contours
            .iter()
            .map(Contour::area)
            .fold(0.0f64, f64::max);
        let rect_area = 120.0 * 90.0;
        assert!(
            (largest - rect_area).abs() < rect_area * 0.1,
            "largest contour area {largest} should be close to {rect_area}"
        );
    }

    #[test]
    fn contour_points_stay_inside_the_image() {
        let image = DynamicImage::ImageLuma8(filled_rect(64, 48, 5, 5, 60, 44));
        for contour in extract_contours(&image, 30.0, 100.0).unwrap() {
            for p in &contour.points {
                assert!(p.x >= 0.0 && p.x < 64.0);
                assert!(p.y >= 0.0 && p.y < 48.0);
            }
        }
    }

    #[test]
    fn extraction_leaves_input_untouched() {
        let rgb = RgbImage::from_fn(50, 40, |x, y| Rgb([(x * 5) as u8, (y * 6) as u8, 77]));
        let image = DynamicImage::ImageRgb8(rgb);
        let before = image.clone();
        let _ = extract_contours(&image, 30.0, 100.0).unwrap();
        assert_eq!(image, before);
    }

    #[test]
    fn gray_alpha_input_is_rejected() {
        let image = DynamicImage::ImageLumaA8(image::ImageBuffer::from_pixel(
            8,
            8,
            image::LumaA([0u8, 255]),
        ));
        assert!(extract_contours(&image, 30.0, 100.0).is_err());
    }
}
