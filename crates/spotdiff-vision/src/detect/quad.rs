// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page quadrilateral selection — sweeps Canny strictness, approximates each
// large contour to a polygon and keeps the largest clean four-sided one.

use image::{DynamicImage, GrayImage};
use spotdiff_core::config::DetectionConfig;
use spotdiff_core::error::Result;
use spotdiff_core::geometry::perpendicular_distance;
use spotdiff_core::{Contour, OrderedCorners, Point, Quadrilateral, order_corners};
use tracing::{debug, info, instrument, warn};

use super::contours::{contours_from_blurred, denoised_gray, has_no_pixels};
use crate::raster::channel_layout;

/// Detect the photographed page using the default detection settings.
///
/// Returns `Ok(None)` when no four-sided contour covers at least 5% of the
/// photo, including for an image with no pixels; that is a normal outcome,
/// not an error.
pub fn select_best_quadrilateral(image: &DynamicImage) -> Result<Option<OrderedCorners>> {
    select_best_quadrilateral_with(image, &DetectionConfig::default())
}

/// Detect the photographed page.
///
/// ## Algorithm
///
/// 1. Grayscale + Gaussian blur, once per photo
/// 2. For each Canny threshold pair (tightest first), trace outer contours
/// 3. Skip contours enclosing less than `min_area_ratio` of the photo
/// 4. Approximate each survivor at every epsilon (fraction of its perimeter)
/// 5. A 4-vertex approximation is a candidate scored by the contour's area;
///    the best candidate is replaced only by a strictly larger one
/// 6. After a pair, stop if the best candidate exceeds
///    `early_stop_area_ratio` of the photo
/// 7. Order the winning vertices TL, TR, BR, BL
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn select_best_quadrilateral_with(
    image: &DynamicImage,
    config: &DetectionConfig,
) -> Result<Option<OrderedCorners>> {
    config.validate()?;
    channel_layout(image)?;
    if has_no_pixels(image) {
        warn!("Empty image; no page to find");
        return Ok(None);
    }
    info!("Starting page detection");

    let blurred = denoised_gray(image, config.blur_kernel_size)?;
    let image_area = image.width() as f64 * image.height() as f64;
    let min_area = image_area * config.min_area_ratio;
    let early_stop_area = image_area * config.early_stop_area_ratio;

    let best = sweep(&blurred, config, min_area, early_stop_area);

    match best.quad() {
        Some(quad) => {
            let corners = order_corners(quad);
            info!(
                area = best.area(),
                top_left = ?corners.top_left,
                top_right = ?corners.top_right,
                bottom_right = ?corners.bottom_right,
                bottom_left = ?corners.bottom_left,
                "Page quadrilateral detected"
            );
            Ok(Some(corners))
        }
        None => {
            warn!(min_area, "No page quadrilateral found");
            Ok(None)
        }
    }
}

// -- Candidate accumulator ----------------------------------------------------

/// Largest qualifying quadrilateral seen so far, with its contour area.
///
/// Replacement requires a strictly larger area, so among equal areas the
/// first one offered wins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BestQuad {
    candidate: Option<(f64, Quadrilateral)>,
}

impl BestQuad {
    /// Offer a candidate; returns whether it became the new best.
    pub fn offer(&mut self, area: f64, quad: Quadrilateral) -> bool {
        if area > self.area() {
            self.candidate = Some((area, quad));
            true
        } else {
            false
        }
    }

    /// Fold a later pass's winner into this one.
    pub fn merge(mut self, later: BestQuad) -> Self {
        if let Some((area, quad)) = later.candidate {
            self.offer(area, quad);
        }
        self
    }

    /// Area of the current best, or 0 when empty.
    pub fn area(&self) -> f64 {
        self.candidate.map_or(0.0, |(area, _)| area)
    }

    pub fn quad(&self) -> Option<Quadrilateral> {
        self.candidate.map(|(_, quad)| quad)
    }
}

/// Combine per-pass winners in pass order, stopping once the running best
/// exceeds `early_stop_area`.
///
/// Lazy iterators skip the remaining passes entirely; eagerly computed passes
/// are simply ignored, so both give the same winner.
pub fn reduce_passes(passes: impl IntoIterator<Item = BestQuad>, early_stop_area: f64) -> BestQuad {
    let mut best = BestQuad::default();
    for (index, pass) in passes.into_iter().enumerate() {
        best = best.merge(pass);
        if best.quad().is_some() && best.area() > early_stop_area {
            debug!(pass = index, area = best.area(), "Early exit: candidate large enough");
            break;
        }
    }
    best
}

#[cfg(not(feature = "parallel"))]
fn sweep(blurred: &GrayImage, config: &DetectionConfig, min_area: f64, early_stop_area: f64) -> BestQuad {
    let passes = config
        .canny_thresholds
        .iter()
        .map(|&(low, high)| scan_pass(blurred, low, high, &config.approx_epsilons, min_area));
    reduce_passes(passes, early_stop_area)
}

#[cfg(feature = "parallel")]
fn sweep(blurred: &GrayImage, config: &DetectionConfig, min_area: f64, early_stop_area: f64) -> BestQuad {
    use rayon::prelude::*;

    // Every pass runs; the ordered reduction restores the sequential winner.
    let passes: Vec<BestQuad> = config
        .canny_thresholds
        .par_iter()
        .map(|&(low, high)| scan_pass(blurred, low, high, &config.approx_epsilons, min_area))
        .collect();
    reduce_passes(passes, early_stop_area)
}

/// One Canny threshold pair: best 4-vertex candidate among its contours.
fn scan_pass(blurred: &GrayImage, low: f32, high: f32, epsilons: &[f64], min_area: f64) -> BestQuad {
    let mut best = BestQuad::default();
    for contour in contours_from_blurred(blurred, low, high) {
        let area = contour.area();
        if area < min_area {
            continue;
        }
        if let Some(quad) = quadrilateral_of(&contour, epsilons) {
            best.offer(area, quad);
        }
    }
    debug!(low, high, area = best.area(), "Threshold pass complete");
    best
}

/// First 4-vertex approximation of `contour` across `epsilons` (each a
/// fraction of the perimeter).
fn quadrilateral_of(contour: &Contour, epsilons: &[f64]) -> Option<Quadrilateral> {
    let perimeter = contour.perimeter();
    epsilons.iter().find_map(|&eps| {
        let approx = approximate_polygon(&contour.points, eps * perimeter);
        <[Point; 4]>::try_from(approx.as_slice()).ok()
    })
}

// -- Polygon approximation ----------------------------------------------------

/// Douglas-Peucker simplification of a closed polygon.
///
/// The ring is first cut at two mutually distant vertices (the point farthest
/// from the first vertex, then the point farthest from that), which are
/// always kept. Each half is then simplified, keeping any vertex farther than
/// `epsilon` from the chord of its span. Output vertices keep ring order.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, points[0]);
    let second = farthest_from(points, points[first]);
    if first == second {
        return vec![points[first]];
    }

    let ring: Vec<Point> = points[first..].iter().chain(&points[..first]).copied().collect();
    let cut = (second + n - first) % n;

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[cut] = true;

    // Spans index the ring modulo n, so (cut, n) closes back to the start.
    let mut stack = vec![(0usize, cut), (cut, n)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let a = ring[start % n];
        let b = ring[end % n];
        let mut max_dist = 0.0;
        let mut index = start;
        for i in start + 1..end {
            let d = perpendicular_distance(ring[i], a, b);
            if d > max_dist {
                max_dist = d;
                index = i;
            }
        }
        if max_dist > epsilon {
            keep[index] = true;
            stack.push((index, end));
            stack.push((start, index));
        }
    }

    ring.into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

fn farthest_from(points: &[Point], origin: Point) -> usize {
    let mut best = 0;
    let mut best_dist = -1.0f32;
    for (i, p) in points.iter().enumerate() {
        let dx = p.x - origin.x;
        let dy = p.y - origin.y;
        let d = dx * dx + dy * dy;
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point as PixelPoint;

    fn assert_near(actual: Point, expected: (f32, f32), tolerance: f32) {
        let dx = (actual.x - expected.0).abs();
        let dy = (actual.y - expected.1).abs();
        assert!(
            dx <= tolerance && dy <= tolerance,
            "corner {actual:?} not within {tolerance}px of {expected:?}"
        );
    }

    fn quad(area_tag: f32) -> Quadrilateral {
        [
            Point::new(area_tag, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn accumulator_replaces_only_on_strict_improvement() {
        let mut best = BestQuad::default();
        assert!(best.offer(100.0, quad(1.0)));
        assert!(!best.offer(100.0, quad(2.0)));
        assert!(!best.offer(50.0, quad(3.0)));
        assert_eq!(best.quad(), Some(quad(1.0)));
        assert!(best.offer(150.0, quad(4.0)));
        assert_eq!(best.quad(), Some(quad(4.0)));
        assert_eq!(best.area(), 150.0);
    }

    #[test]
    fn reduction_keeps_earlier_pass_on_ties() {
        let mut first = BestQuad::default();
        first.offer(500.0, quad(1.0));
        let mut second = BestQuad::default();
        second.offer(500.0, quad(2.0));
        let best = reduce_passes([first, second], f64::INFINITY);
        assert_eq!(best.quad(), Some(quad(1.0)));
    }

    #[test]
    fn reduction_stops_after_large_candidate() {
        let mut first = BestQuad::default();
        first.offer(300.0, quad(1.0));
        let mut second = BestQuad::default();
        second.offer(900.0, quad(2.0));
        // 300 already exceeds the early-stop area, so the larger second pass
        // is never consulted.
        let best = reduce_passes([first, second], 250.0);
        assert_eq!(best.quad(), Some(quad(1.0)));

        let best = reduce_passes([first, second], 400.0);
        assert_eq!(best.quad(), Some(quad(2.0)));
    }

    #[test]
    fn reduction_of_empty_passes_is_empty() {
        let best = reduce_passes([BestQuad::default(), BestQuad::default()], 0.0);
        assert!(best.quad().is_none());
    }

    #[test]
    fn approximation_reduces_noisy_square_to_four_vertices() {
        let mut ring = Vec::new();
        for i in 0..=100 {
            let wobble = if i % 2 == 0 { 0.4 } else { -0.4 };
            ring.push(Point::new(i as f32, wobble));
        }
        for i in 1..=100 {
            ring.push(Point::new(100.0, i as f32));
        }
        for i in (0..100).rev() {
            ring.push(Point::new(i as f32, 100.0));
        }
        for i in (1..100).rev() {
            ring.push(Point::new(0.0, i as f32));
        }
        let approx = approximate_polygon(&ring, 0.02 * 400.0);
        assert_eq!(approx.len(), 4, "got {approx:?}");
        for corner in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
            assert!(
                approx.iter().any(|p| (p.x - corner.0).abs() <= 1.0 && (p.y - corner.1).abs() <= 1.0),
                "missing corner {corner:?} in {approx:?}"
            );
        }
    }

    #[test]
    fn approximation_keeps_triangle() {
        let triangle = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, 80.0),
        ];
        let approx = approximate_polygon(&triangle, 2.0);
        assert_eq!(approx.len(), 3);
    }

    #[test]
    fn axis_aligned_rectangle_is_detected() {
        let mut canvas = GrayImage::from_pixel(400, 300, Luma([0u8]));
        for y in 60..240 {
            for x in 80..320 {
                canvas.put_pixel(x, y, Luma([255u8]));
            }
        }
        let image = DynamicImage::ImageLuma8(canvas);

        let corners = select_best_quadrilateral(&image)
            .unwrap()
            .expect("rectangle should be detected");
        assert_near(corners.top_left, (80.0, 60.0), 3.0);
        assert_near(corners.top_right, (319.0, 60.0), 3.0);
        assert_near(corners.bottom_right, (319.0, 239.0), 3.0);
        assert_near(corners.bottom_left, (80.0, 239.0), 3.0);
    }

    #[test]
    fn uniform_image_has_no_page() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(320, 240, Rgba([200, 180, 40, 255])));
        assert!(select_best_quadrilateral(&image).unwrap().is_none());
    }

    #[test]
    fn empty_images_have_no_page() {
        for (w, h) in [(0u32, 0u32), (0, 10), (10, 0)] {
            let gray = DynamicImage::ImageLuma8(GrayImage::new(w, h));
            assert!(select_best_quadrilateral(&gray).unwrap().is_none());
            let rgba = DynamicImage::ImageRgba8(RgbaImage::new(w, h));
            assert!(select_best_quadrilateral(&rgba).unwrap().is_none());
        }
    }

    #[test]
    fn small_rectangle_is_below_area_floor() {
        let mut canvas = GrayImage::from_pixel(400, 300, Luma([0u8]));
        for y in 100..120 {
            for x in 100..120 {
                canvas.put_pixel(x, y, Luma([255u8]));
            }
        }
        let image = DynamicImage::ImageLuma8(canvas);
        assert!(select_best_quadrilateral(&image).unwrap().is_none());
    }

    /// 1200x800 RGBA photo with a skewed light page on a dark table.
    fn skewed_page_photo() -> DynamicImage {
        let mut canvas = RgbaImage::from_pixel(1200, 800, Rgba([40, 40, 50, 255]));
        let page = [
            PixelPoint::new(100, 50),
            PixelPoint::new(1100, 80),
            PixelPoint::new(1150, 750),
            PixelPoint::new(80, 720),
        ];
        draw_polygon_mut(&mut canvas, &page, Rgba([235, 235, 225, 255]));
        DynamicImage::ImageRgba8(canvas)
    }

    #[test]
    fn skewed_page_in_rgba_photo_is_detected() {
        let image = skewed_page_photo();

        let corners = select_best_quadrilateral(&image)
            .unwrap()
            .expect("page should be detected");
        assert_near(corners.top_left, (100.0, 50.0), 4.0);
        assert_near(corners.top_right, (1100.0, 80.0), 4.0);
        assert_near(corners.bottom_right, (1150.0, 750.0), 4.0);
        assert_near(corners.bottom_left, (80.0, 720.0), 4.0);
    }

    /// Rayon runs every pass, so the winner must still come out of the
    /// ordered reduction exactly as the lazy sequential loop picks it.
    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_sweep_picks_sequential_winner() {
        let image = skewed_page_photo();
        let config = DetectionConfig::default();
        let blurred = denoised_gray(&image, config.blur_kernel_size).unwrap();
        let image_area = image.width() as f64 * image.height() as f64;
        let min_area = image_area * config.min_area_ratio;

        for early_stop_area in [image_area * config.early_stop_area_ratio, f64::INFINITY] {
            let sequential = reduce_passes(
                config.canny_thresholds.iter().map(|&(low, high)| {
                    scan_pass(&blurred, low, high, &config.approx_epsilons, min_area)
                }),
                early_stop_area,
            );
            let parallel = sweep(&blurred, &config, min_area, early_stop_area);
            assert!(parallel.quad().is_some());
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn invalid_config_is_reported() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let config = DetectionConfig {
            canny_thresholds: Vec::new(),
            ..DetectionConfig::default()
        };
        assert!(select_best_quadrilateral_with(&image, &config).is_err());
    }
}
