// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// spotdiff-vision — Image pipeline for photographed spot-the-difference
// puzzles.
//
// Finds the page quadrilateral in a photo (edge contours + polygon
// approximation), flattens it with a perspective warp, equalises contrast
// per channel, and bisects the result into the two puzzle panels.

pub mod detect;
pub mod pipeline;
pub mod raster;
pub mod transform;

// Re-export the stage entry points so callers can use
// `spotdiff_vision::rectify` etc.
pub use detect::contours::extract_contours;
pub use detect::quad::{select_best_quadrilateral, select_best_quadrilateral_with};
pub use pipeline::SpotDiffPipeline;
pub use spotdiff_core::order_corners;
pub use transform::normalize::normalize;
pub use transform::rectify::rectify;
pub use transform::split::{ImagePair, split};
