// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Full photo pipeline — detect, (adjust), rectify, normalise, split.

use std::borrow::Cow;

use image::DynamicImage;
use spotdiff_core::error::Result;
use spotdiff_core::{OrderedCorners, PipelineConfig};
use tracing::{info, instrument, warn};

use crate::detect::select_best_quadrilateral_with;
use crate::raster::channel_layout;
use crate::transform::{ImagePair, normalize, rectify_with_background, split};

/// Runs the stages in order for one photo at a time.
///
/// Detection and processing are separate calls so a UI can show the
/// detected corners, let the player drag them, and hand the adjusted corners
/// to [`process`](Self::process):
///
/// ```ignore
/// let pipeline = SpotDiffPipeline::default();
/// let photo = spotdiff_vision::raster::decode(&bytes)?;
/// let corners = pipeline.detect(&photo)?;
/// // ... player adjusts corners ...
/// let halves = pipeline.process(&photo, corners.as_ref())?;
/// let (left_png, right_png) = halves.to_png_bytes()?;
/// ```
///
/// The pipeline holds only configuration and is `Send + Sync`; photos can be
/// processed from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct SpotDiffPipeline {
    config: PipelineConfig,
}

impl SpotDiffPipeline {
    /// Build a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Look for the page; `None` means the photo will be used as is.
    pub fn detect(&self, image: &DynamicImage) -> Result<Option<OrderedCorners>> {
        select_best_quadrilateral_with(image, &self.config.detection)
    }

    /// Rectify (when corners are given), normalise, and split.
    ///
    /// Corners are clamped to the photo bounds first. Corners too collapsed
    /// to rectify are logged and skipped, so the photo is treated as already
    /// flat instead of failing.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), corners = corners.is_some()))]
    pub fn process(&self, image: &DynamicImage, corners: Option<&OrderedCorners>) -> Result<ImagePair> {
        channel_layout(image)?;

        let flattened: Cow<'_, DynamicImage> = match corners {
            Some(corners) => {
                let clamped = corners.clamped_to(image.width(), image.height());
                match rectify_with_background(image, &clamped, self.config.background) {
                    Ok(warped) => Cow::Owned(warped),
                    Err(err) if err.is_recoverable() => {
                        warn!(error = %err, "Skipping rectification; using photo as taken");
                        Cow::Borrowed(image)
                    }
                    Err(err) => return Err(err),
                }
            }
            None => {
                info!("No corners supplied; using photo as taken");
                Cow::Borrowed(image)
            }
        };

        let pair = if self.config.equalize_colors {
            split(&normalize(&flattened)?)
        } else {
            split(&flattened)
        };

        info!(
            left_w = pair.left.width(),
            right_w = pair.right.width(),
            height = pair.left.height(),
            "Photo split into halves"
        );
        Ok(pair)
    }

    /// Detect and process without any corner adjustment.
    pub fn run(&self, image: &DynamicImage) -> Result<ImagePair> {
        let corners = self.detect(image)?;
        self.process(image, corners.as_ref())
    }
}
