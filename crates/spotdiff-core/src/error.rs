// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the spotdiff pipeline.

use thiserror::Error;

/// Top-level error type for all spotdiff operations.
///
/// "No page found" is deliberately absent: detection reports that as
/// `Ok(None)`, and callers carry on without rectification.
#[derive(Debug, Error)]
pub enum SpotDiffError {
    // -- Geometry --
    #[error("corners collapse to a degenerate rectangle ({width:.2} x {height:.2})")]
    DegenerateGeometry { width: f32, height: f32 },

    // -- Pixel buffers --
    #[error("unsupported channel layout: {0}")]
    UnsupportedChannelLayout(String),

    #[error("pixel buffer has {actual} samples, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    // -- Boundary codecs --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Configuration --
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SpotDiffError {
    /// Whether the pipeline can carry on by skipping the failed stage.
    ///
    /// Only degenerate corner geometry qualifies: the photo is then treated
    /// as already flat.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpotDiffError>;
