// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// spotdiff — Core types, geometry and error definitions shared by the
// rectification pipeline crates.

pub mod config;
pub mod corners;
pub mod error;
pub mod geometry;
pub mod human_errors;
pub mod types;

pub use config::{DetectionConfig, PipelineConfig};
pub use corners::order_corners;
pub use error::SpotDiffError;
pub use types::*;
