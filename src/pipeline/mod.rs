//! Detection, matching and homography estimation behind one validated
//! configuration.
//!
//! ```text
//! image ─► scale space ─► extrema ─► refine + describe ─► keypoints
//! keypoints(query) × keypoints(train) ─► ratio-test matches ─► RANSAC ─► H
//! ```

pub mod params;

pub use params::PipelineParams;

use crate::diagnostics::{elapsed_ms, DetectionReport, MatchReport, TimingBreakdown};
use crate::error::ConfigError;
use crate::homography::{estimate_homography, Homography, HomographyError};
use crate::image::ImageF32;
use crate::keypoints::{Keypoint, KeypointDetector};
use crate::matching::{match_features_with_report, FeatureMatch};

use log::debug;
use serde::Serialize;
use std::time::Instant;

/// Everything measured while comparing two images.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport {
    pub query: DetectionReport,
    pub train: DetectionReport,
    pub matching: MatchReport,
    pub timing: TimingBreakdown,
}

/// Facade over the full pipeline.
#[derive(Clone, Debug)]
pub struct FeaturePipeline {
    params: PipelineParams,
    detector: KeypointDetector,
}

impl FeaturePipeline {
    /// Validate `params` and build the pipeline.
    pub fn new(params: PipelineParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let detector = KeypointDetector::new(params.scale_space, params.keypoints)?;
        Ok(Self { params, detector })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Keypoints of `image`; empty for images smaller than `min_image_size`.
    pub fn detect_keypoints(&self, image: &ImageF32) -> Vec<Keypoint> {
        self.detector.detect(image)
    }

    pub fn detect_keypoints_with_report(
        &self,
        image: &ImageF32,
    ) -> (Vec<Keypoint>, DetectionReport) {
        self.detector.detect_with_report(image)
    }

    /// Ratio-test matches from `query` into `train`.
    pub fn match_keypoints<'a>(
        &self,
        query: &'a [Keypoint],
        train: &'a [Keypoint],
    ) -> (Vec<FeatureMatch<'a>>, MatchReport) {
        match_features_with_report(query, train, &self.params.matching)
    }

    /// Robust homography from `matches`, seeded from the configuration.
    pub fn estimate(&self, matches: &[FeatureMatch<'_>]) -> Result<Homography, HomographyError> {
        estimate_homography(matches, &self.params.ransac)
    }

    /// Homography mapping `query` image coordinates onto `train`.
    pub fn match_and_estimate(
        &self,
        query: &ImageF32,
        train: &ImageF32,
    ) -> Result<Homography, HomographyError> {
        self.match_and_estimate_with_report(query, train).0
    }

    pub fn match_and_estimate_with_report(
        &self,
        query: &ImageF32,
        train: &ImageF32,
    ) -> (Result<Homography, HomographyError>, PairReport) {
        let t_total = Instant::now();
        let (query_kps, query_report) = self.detect_keypoints_with_report(query);
        let (train_kps, train_report) = self.detect_keypoints_with_report(train);

        let t_match = Instant::now();
        let (matches, match_report) = self.match_keypoints(&query_kps, &train_kps);
        let match_ms = elapsed_ms(t_match);

        let t_ransac = Instant::now();
        let result = self.estimate(&matches);
        let ransac_ms = elapsed_ms(t_ransac);

        match &result {
            Ok(h) => debug!(
                "pipeline: homography with {}/{} inliers, det={:.4}",
                h.inlier_count(),
                h.total_matches,
                h.determinant()
            ),
            Err(e) => debug!("pipeline: estimation failed: {e}"),
        }

        let mut timing = TimingBreakdown::with_total(elapsed_ms(t_total));
        timing.push("detect_query", query_report.timing.total_ms);
        timing.push("detect_train", train_report.timing.total_ms);
        timing.push("matching", match_ms);
        timing.push("ransac", ransac_ms);

        let report = PairReport {
            query: query_report,
            train: train_report,
            matching: match_report,
            timing,
        };
        (result, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_are_rejected_before_running() {
        let mut params = PipelineParams::default();
        params.scale_space.base_sigma = -1.0;
        assert!(matches!(
            FeaturePipeline::new(params),
            Err(ConfigError::NonPositive {
                field: "base_sigma",
                ..
            })
        ));
    }

    #[test]
    fn blank_images_fail_with_invalid_homography() {
        let pipeline = FeaturePipeline::new(PipelineParams::default()).unwrap();
        let img = ImageF32::from_fn(48, 48, |_, _| 128.0);
        let (result, report) = pipeline.match_and_estimate_with_report(&img, &img);
        assert_eq!(result, Err(HomographyError::InvalidHomography));
        assert_eq!(report.matching.matches, 0);
        assert_eq!(report.timing.stages.len(), 4);
    }
}
