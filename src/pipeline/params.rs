//! Aggregate configuration of the detect → match → estimate pipeline.
//!
//! Every stage reads its own section by reference; the aggregate is validated
//! once when a [`FeaturePipeline`](super::FeaturePipeline) is built.

use crate::error::ConfigError;
use crate::homography::RansacOptions;
use crate::keypoints::KeypointOptions;
use crate::matching::MatchOptions;
use crate::pyramid::ScaleSpaceOptions;

use serde::{Deserialize, Serialize};

/// Parameters for all pipeline stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Gaussian/DoG pyramid construction.
    pub scale_space: ScaleSpaceOptions,
    /// Extrema search, refinement and descriptor.
    pub keypoints: KeypointOptions,
    /// Ratio test and optional distance cap.
    pub matching: MatchOptions,
    /// RANSAC and the validity gates of the final homography.
    pub ransac: RansacOptions,
}

impl PipelineParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale_space.validate()?;
        self.keypoints.validate()?;
        self.matching.validate()?;
        self.ransac.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: PipelineParams =
            serde_json::from_str(r#"{"ransac": {"seed": 7}, "scale_space": {"min_image_size": 32}}"#)
                .unwrap();
        assert_eq!(params.ransac.seed, 7);
        assert_eq!(params.ransac.iterations, 1000);
        assert_eq!(params.scale_space.min_image_size, 32);
        assert_eq!(params.keypoints, KeypointOptions::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn first_invalid_section_is_reported() {
        let mut params = PipelineParams::default();
        params.ransac.iterations = 0;
        assert_eq!(params.validate(), Err(ConfigError::ZeroIterations));
    }
}
