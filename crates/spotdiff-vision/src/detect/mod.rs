// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page detection — edge contour extraction and quadrilateral selection.

pub mod contours;
pub mod quad;

pub use contours::extract_contours;
pub use quad::{BestQuad, select_best_quadrilateral, select_best_quadrilateral_with};
