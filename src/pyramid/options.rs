use crate::error::{ensure_in_range, ensure_positive, ConfigError};

use serde::{Deserialize, Serialize};

/// Options controlling scale-space construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSpaceOptions {
    /// Blur of the first Gaussian image in every octave.
    pub base_sigma: f32,
    /// Number of scale steps needed to double sigma. Each octave holds
    /// `images_per_octave + 3` Gaussian and `images_per_octave + 2` DoG images.
    pub images_per_octave: usize,
    /// Resolution ratio between consecutive octaves (> 1).
    pub downscale_factor: f32,
    /// Smallest admissible octave side length in pixels.
    pub min_image_size: usize,
}

impl Default for ScaleSpaceOptions {
    fn default() -> Self {
        Self {
            base_sigma: 1.6,
            images_per_octave: 3,
            downscale_factor: 2.0,
            min_image_size: 16,
        }
    }
}

impl ScaleSpaceOptions {
    pub fn new(base_sigma: f32, images_per_octave: usize) -> Self {
        Self {
            base_sigma,
            images_per_octave,
            ..Default::default()
        }
    }

    pub fn with_downscale_factor(mut self, factor: f32) -> Self {
        self.downscale_factor = factor;
        self
    }

    pub fn with_min_image_size(mut self, size: usize) -> Self {
        self.min_image_size = size;
        self
    }

    /// Sigma growth between consecutive Gaussian images, `2^(1/s)`.
    pub fn sigma_ratio(&self) -> f32 {
        2f32.powf(1.0 / self.images_per_octave as f32)
    }

    /// Blur levels for one octave: `base_sigma * r^i` for `i in 0..s+3`.
    pub fn sigmas(&self) -> Vec<f32> {
        let r = self.sigma_ratio();
        (0..self.images_per_octave + 3)
            .map(|i| self.base_sigma * r.powi(i as i32))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("base_sigma", self.base_sigma as f64)?;
        ensure_in_range(
            "images_per_octave",
            self.images_per_octave as f64,
            1.0,
            64.0,
        )?;
        if !(self.downscale_factor.is_finite() && self.downscale_factor > 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "downscale_factor",
                value: self.downscale_factor as f64,
                min: 1.0,
                max: f64::INFINITY,
            });
        }
        ensure_in_range(
            "min_image_size",
            self.min_image_size as f64,
            3.0,
            f64::INFINITY,
        )
    }
}
