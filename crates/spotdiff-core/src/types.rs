// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the spotdiff pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpotDiffError};

/// Sub-pixel image coordinate. Origin is the top-left pixel, y grows down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Tuple form expected by `imageproc` control-point APIs.
    pub fn to_tuple(self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Closed boundary traced from an edge map. Consecutive collinear steps have
/// already been merged, so the point count depends on the shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area (shoelace).
    pub fn area(&self) -> f64 {
        crate::geometry::polygon_area(&self.points)
    }

    /// Closed perimeter.
    pub fn perimeter(&self) -> f64 {
        crate::geometry::perimeter(&self.points)
    }
}

/// Four vertices straight out of polygon approximation, in trace order.
pub type Quadrilateral = [Point; 4];

/// Page corners in canonical clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl OrderedCorners {
    /// `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Build from an array already in TL, TR, BR, BL order. No reordering is
    /// done; use [`crate::order_corners`] for arbitrary input.
    pub fn from_array(corners: [Point; 4]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = corners;
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Clamp every corner onto the pixel grid of a `width x height` image,
    /// i.e. `[0, width - 1] x [0, height - 1]`.
    ///
    /// Corners dragged past the photo edge are pinned to the last pixel
    /// rather than rejected, so the warp never samples outside the photo.
    pub fn clamped_to(&self, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        Self::from_array(
            self.to_array()
                .map(|p| crate::geometry::clamp_point(p, max_x, max_y)),
        )
    }
}

/// Supported pixel layouts. All samples are 8-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelLayout {
    Gray,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Map a channel count onto a layout.
    pub fn from_channel_count(channels: u8) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(SpotDiffError::UnsupportedChannelLayout(format!(
                "{other} channels (expected 1, 3 or 4)"
            ))),
        }
    }

    pub fn channel_count(&self) -> u8 {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}
