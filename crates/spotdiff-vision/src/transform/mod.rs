// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image transforms — perspective rectification, histogram equalisation, and
// left/right bisection. Each stage borrows its input and returns a new buffer.

pub mod normalize;
pub mod rectify;
pub mod split;

pub use normalize::normalize;
pub use rectify::{rectify, rectify_with_background};
pub use split::{ImagePair, split};
