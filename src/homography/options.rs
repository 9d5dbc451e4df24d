use crate::error::{ensure_in_range, ensure_positive, ConfigError};

use serde::{Deserialize, Serialize};

/// RANSAC homography estimation options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacOptions {
    /// Number of 4-point hypotheses.
    pub iterations: usize,
    /// Inlier gate on the reprojection error, in pixels.
    pub reprojection_threshold: f64,
    /// Minimum `inliers / matches` of the final model.
    pub inlier_ratio_threshold: f64,
    /// Admissible `[min, max]` for `det(H)`.
    pub determinant_bounds: [f64; 2],
    /// Seed of the sampling RNG.
    pub seed: u64,
    /// Optional wall-clock budget; hypotheses not started in time are skipped.
    pub time_budget_ms: Option<u64>,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            iterations: 1000,
            reprojection_threshold: 3.0,
            inlier_ratio_threshold: 0.5,
            determinant_bounds: [0.1, 10.0],
            seed: 0,
            time_budget_ms: None,
        }
    }
}

impl RansacOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        ensure_positive("reprojection_threshold", self.reprojection_threshold)?;
        ensure_in_range(
            "inlier_ratio_threshold",
            self.inlier_ratio_threshold,
            0.0,
            1.0,
        )?;
        let [min, max] = self.determinant_bounds;
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(ConfigError::InvalidBounds {
                field: "determinant_bounds",
                min,
                max,
            });
        }
        Ok(())
    }
}
