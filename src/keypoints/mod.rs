//! Keypoint detection on a DoG pyramid.
//!
//! Overview
//! - For every octave and every interior DoG layer, form an [`OctaveSlice`],
//!   search strict extrema (`extrema`), refine each candidate (`refine`) and
//!   describe the survivors (`descriptor`).
//! - Slices are independent; with the `parallel` feature each
//!   `(octave, scale)` pair runs as its own rayon task and results are merged
//!   afterwards in octave-then-scale order, so output order never depends on
//!   scheduling.
//!
//! Keypoint coordinates are local to their octave; see
//! [`Keypoint::image_position`].

pub mod descriptor;
pub mod extrema;
pub mod kernels;
pub mod options;
pub mod refine;
pub mod types;

pub use descriptor::{build_descriptor, normalize_descriptor, GradientWindow};
pub use extrema::find_extrema;
pub use kernels::{DerivativeKernel, SobelKernel, SOBEL_3X3, SOBEL_5X5};
pub use options::KeypointOptions;
pub use refine::{KeypointRefiner, Rejection};
pub use types::{descriptor_distance, Keypoint, OctaveSlice, PixelPoint, DESCRIPTOR_LEN};

use crate::diagnostics::{
    elapsed_ms, DetectionReport, OctaveReport, RejectionCounts, TimingBreakdown,
};
use crate::error::ConfigError;
use crate::image::ImageF32;
use crate::pyramid::{build_dog_pyramid, DogOctave, ScaleSpaceOptions};

use log::debug;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of scanning one `(octave, scale)` slice.
struct SliceOutcome {
    octave: usize,
    raw_extrema: usize,
    keypoints: Vec<Keypoint>,
    rejections: RejectionCounts,
}

/// Validated detector bundling scale-space and keypoint options.
#[derive(Clone, Debug)]
pub struct KeypointDetector {
    scale_space: ScaleSpaceOptions,
    options: KeypointOptions,
    kernel: &'static SobelKernel,
}

impl KeypointDetector {
    pub fn new(
        scale_space: ScaleSpaceOptions,
        options: KeypointOptions,
    ) -> Result<Self, ConfigError> {
        scale_space.validate()?;
        options.validate()?;
        let kernel = options.derivative_kernel()?;
        Ok(Self {
            scale_space,
            options,
            kernel,
        })
    }

    pub fn scale_space(&self) -> &ScaleSpaceOptions {
        &self.scale_space
    }

    pub fn options(&self) -> &KeypointOptions {
        &self.options
    }

    /// Detect and describe keypoints. A degenerate image yields an empty list.
    pub fn detect(&self, image: &ImageF32) -> Vec<Keypoint> {
        self.detect_with_report(image).0
    }

    /// Detect keypoints and report per-octave counts and stage timings.
    pub fn detect_with_report(&self, image: &ImageF32) -> (Vec<Keypoint>, DetectionReport) {
        let t_total = Instant::now();
        let t_pyr = Instant::now();
        let dogs = build_dog_pyramid(image, &self.scale_space);
        let pyramid_ms = elapsed_ms(t_pyr);

        let t_detect = Instant::now();
        let outcomes = self.scan_octaves(&dogs);
        let detect_ms = elapsed_ms(t_detect);

        let mut octaves: Vec<OctaveReport> = dogs
            .iter()
            .map(|dog| OctaveReport::new(dog.index, dog.width(), dog.height(), dog.scale))
            .collect();
        let mut keypoints = Vec::new();
        for outcome in outcomes {
            if let Some(report) = octaves.get_mut(outcome.octave) {
                report.raw_extrema += outcome.raw_extrema;
                report.accepted += outcome.keypoints.len();
                report.rejections.merge(&outcome.rejections);
            }
            keypoints.extend(outcome.keypoints);
        }

        for o in &octaves {
            debug!(
                "keypoints: octave {} {}x{} raw={} accepted={} rejected={}",
                o.index,
                o.width,
                o.height,
                o.raw_extrema,
                o.accepted,
                o.rejections.total()
            );
        }

        let mut timing = TimingBreakdown::with_total(elapsed_ms(t_total));
        timing.push("scale_space", pyramid_ms);
        timing.push("extrema_refine", detect_ms);

        let report = DetectionReport {
            image_width: image.w,
            image_height: image.h,
            octaves,
            keypoint_count: keypoints.len(),
            timing,
        };
        (keypoints, report)
    }

    fn scan_octaves(&self, dogs: &[DogOctave]) -> Vec<SliceOutcome> {
        let tasks: Vec<(&DogOctave, usize)> = dogs
            .iter()
            .flat_map(|dog| (1..dog.dogs.depth().saturating_sub(1)).map(move |s| (dog, s)))
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes = tasks
            .par_iter()
            .filter_map(|&(dog, s)| self.scan_slice(dog, s))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes = tasks
            .iter()
            .filter_map(|&(dog, s)| self.scan_slice(dog, s))
            .collect();

        outcomes
    }

    fn scan_slice(&self, dog: &DogOctave, scale_index: usize) -> Option<SliceOutcome> {
        let slice = OctaveSlice::from_dog(dog, scale_index)?;
        let candidates = find_extrema(&slice, self.options.extrema_radius);
        let refiner = KeypointRefiner::new(&self.options, self.kernel);
        let mut keypoints = Vec::new();
        let mut rejections = RejectionCounts::default();
        for &candidate in &candidates {
            match refiner.evaluate(&slice, candidate) {
                Ok(kp) => keypoints.push(kp),
                Err(reason) => rejections.record(reason),
            }
        }
        Some(SliceOutcome {
            octave: dog.index,
            raw_extrema: candidates.len(),
            keypoints,
            rejections,
        })
    }
}

/// Detect keypoints with explicit options. Invalid options yield an error
/// before any work is done.
pub fn detect_keypoints(
    image: &ImageF32,
    scale_space: &ScaleSpaceOptions,
    options: &KeypointOptions,
) -> Result<Vec<Keypoint>, ConfigError> {
    Ok(KeypointDetector::new(*scale_space, *options)?.detect(image))
}
