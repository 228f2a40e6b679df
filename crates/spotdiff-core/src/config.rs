// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpotDiffError};

/// Canny hysteresis pairs, tightest first.
pub const DEFAULT_CANNY_THRESHOLDS: [(f32, f32); 3] = [(30.0, 100.0), (50.0, 150.0), (75.0, 200.0)];

/// Polygon approximation tolerances as a fraction of the contour perimeter.
pub const DEFAULT_APPROX_EPSILONS: [f64; 3] = [0.02, 0.03, 0.04];

/// Contours enclosing less than this fraction of the image are ignored.
pub const DEFAULT_MIN_AREA_RATIO: f64 = 0.05;

/// Once the best candidate covers this fraction of the image, looser
/// threshold pairs are skipped.
pub const DEFAULT_EARLY_STOP_AREA_RATIO: f64 = 0.2;

/// Side of the square Gaussian kernel applied before edge detection.
pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 5;

/// Page detection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// `(low, high)` Canny thresholds, swept in order.
    pub canny_thresholds: Vec<(f32, f32)>,
    /// Approximation tolerances tried for every contour, in order.
    pub approx_epsilons: Vec<f64>,
    /// Minimum contour area as a fraction of `width * height`.
    pub min_area_ratio: f64,
    /// Early-exit area as a fraction of `width * height`.
    pub early_stop_area_ratio: f64,
    /// Odd Gaussian kernel size; sigma is derived from it.
    pub blur_kernel_size: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            canny_thresholds: DEFAULT_CANNY_THRESHOLDS.to_vec(),
            approx_epsilons: DEFAULT_APPROX_EPSILONS.to_vec(),
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            early_stop_area_ratio: DEFAULT_EARLY_STOP_AREA_RATIO,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
        }
    }
}

impl DetectionConfig {
    /// Reject settings the detector cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.canny_thresholds.is_empty() {
            return Err(SpotDiffError::InvalidConfig(
                "at least one Canny threshold pair is required".into(),
            ));
        }
        for &(low, high) in &self.canny_thresholds {
            if !(low >= 0.0 && low <= high) {
                return Err(SpotDiffError::InvalidConfig(format!(
                    "Canny thresholds must satisfy 0 <= low <= high, got ({low}, {high})"
                )));
            }
        }
        if self.approx_epsilons.is_empty() {
            return Err(SpotDiffError::InvalidConfig(
                "at least one approximation epsilon is required".into(),
            ));
        }
        if let Some(eps) = self.approx_epsilons.iter().find(|e| !(**e > 0.0)) {
            return Err(SpotDiffError::InvalidConfig(format!(
                "approximation epsilon must be positive, got {eps}"
            )));
        }
        for (name, ratio) in [
            ("min_area_ratio", self.min_area_ratio),
            ("early_stop_area_ratio", self.early_stop_area_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(SpotDiffError::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {ratio}"
                )));
            }
        }
        if self.blur_kernel_size < 3 || self.blur_kernel_size % 2 == 0 {
            return Err(SpotDiffError::InvalidConfig(format!(
                "blur kernel size must be odd and >= 3, got {}",
                self.blur_kernel_size
            )));
        }
        Ok(())
    }
}

/// Settings for a full detect → rectify → normalise → split run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detection: DetectionConfig,
    /// Apply per-channel histogram equalisation before splitting.
    pub equalize_colors: bool,
    /// RGB fill for rectified pixels that fall outside the photo.
    pub background: [u8; 3],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            equalize_colors: true,
            background: [0, 0, 0],
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()
    }
}
