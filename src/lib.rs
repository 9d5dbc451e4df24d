#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod homography;
pub mod image;
pub mod keypoints;
pub mod matching;
pub mod pipeline;

// Stage internals, public for tools and tests.
pub mod config;
pub mod pyramid;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pipeline facade + configuration.
pub use crate::error::ConfigError;
pub use crate::pipeline::{FeaturePipeline, PairReport, PipelineParams};

// Stage results.
pub use crate::homography::{Homography, HomographyError};
pub use crate::keypoints::{detect_keypoints, Keypoint, KeypointDetector};
pub use crate::matching::{match_features, FeatureMatch};

// Diagnostics returned alongside results.
pub use crate::diagnostics::{DetectionReport, MatchReport, TimingBreakdown};

// Convenience homography helpers that are generally useful.
pub use crate::homography::{apply_homography_points, project, reprojection_error};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use keypoint_matcher::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (w, h) = (320usize, 240usize);
/// let a = vec![0u8; w * h];
/// let b = vec![0u8; w * h];
/// let query = ImageF32::from_u8(ImageU8::packed(w, h, &a).unwrap());
/// let train = ImageF32::from_u8(ImageU8::packed(w, h, &b).unwrap());
///
/// let pipeline = FeaturePipeline::new(PipelineParams::default())?;
/// match pipeline.match_and_estimate(&query, &train) {
///     Ok(hom) => println!("inliers={}/{}", hom.inlier_count(), hom.total_matches),
///     Err(err) => println!("no alignment: {err}"),
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, ImageU8};
    pub use crate::{
        FeaturePipeline, Homography, HomographyError, Keypoint, PipelineParams,
    };
}
