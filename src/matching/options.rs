use crate::error::{ensure_in_range, ensure_positive, ConfigError};

use serde::{Deserialize, Serialize};

/// Nearest-neighbour matching options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Lowe ratio: accept only if `best < lowe_ratio * second_best`.
    pub lowe_ratio: f32,
    /// Optional absolute cap on the best descriptor distance.
    pub distance_threshold: Option<f32>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            lowe_ratio: 0.8,
            distance_threshold: None,
        }
    }
}

impl MatchOptions {
    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = Some(threshold);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("lowe_ratio", self.lowe_ratio as f64)?;
        ensure_in_range("lowe_ratio", self.lowe_ratio as f64, 0.0, 1.0)?;
        if let Some(t) = self.distance_threshold {
            ensure_positive("distance_threshold", t as f64)?;
        }
        Ok(())
    }
}
