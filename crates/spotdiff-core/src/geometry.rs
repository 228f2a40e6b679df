// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry helpers on `Point`: distances, polygon area and perimeter,
// bounds clamping.

use crate::types::Point;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Area of a closed polygon using the shoelace formula.
///
/// Vertices must be in order (either winding); the result is unsigned.
/// Accumulates in `f64` since traced contours can hold thousands of points.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as f64 * points[j].y as f64;
        area -= points[j].x as f64 * points[i].y as f64;
    }
    area.abs() / 2.0
}

/// Length of the closed polyline through `points`, including the closing
/// edge back to the first vertex.
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0f64;
    let mut prev = points[n - 1];
    for &p in points {
        total += distance(prev, p) as f64;
        prev = p;
    }
    total
}

/// Distance from `p` to the infinite line through `a` and `b`. Falls back to
/// the point distance when `a == b`.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        return distance(p, a) as f64;
    }
    ((p.x - a.x) as f64 * dy - (p.y - a.y) as f64 * dx).abs() / len
}

/// Clamp a point into `[0, max_x] x [0, max_y]`.
pub fn clamp_point(p: Point, max_x: f32, max_y: f32) -> Point {
    Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
}
