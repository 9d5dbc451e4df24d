//! RANSAC over 4-point DLT hypotheses.
//!
//! Sampling is separated from evaluation: all samples are drawn from the
//! seeded RNG in iteration order before any hypothesis is scored. Scoring is
//! independent per hypothesis (parallel with the `parallel` feature), and the
//! best model is chosen by a sequential reduction over the results in
//! iteration order: most inliers wins, the earliest iteration wins ties. The
//! outcome therefore does not depend on thread scheduling. Only
//! `time_budget_ms` can make a run non-reproducible, since it skips
//! hypotheses by wall-clock time.
use super::dlt::{fit_homography, MIN_CORRESPONDENCES};
use super::error::HomographyError;
use super::options::RansacOptions;
use super::{reprojection_error, Homography};
use crate::matching::FeatureMatch;

use log::{debug, warn};
use nalgebra::Matrix3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sine of the smallest angle at which three sample points still count as
/// spanning a triangle.
const COLLINEAR_SINE: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
struct Hypothesis {
    iteration: usize,
    matrix: Matrix3<f64>,
    inliers: usize,
}

fn inlier_indices(h: &Matrix3<f64>, src: &[[f64; 2]], dst: &[[f64; 2]], threshold: f64) -> Vec<usize> {
    src.iter()
        .zip(dst)
        .enumerate()
        .filter(|(_, (s, d))| reprojection_error(h, s, d) < threshold)
        .map(|(i, _)| i)
        .collect()
}

fn count_inliers(h: &Matrix3<f64>, src: &[[f64; 2]], dst: &[[f64; 2]], threshold: f64) -> usize {
    src.iter()
        .zip(dst)
        .filter(|(s, d)| reprojection_error(h, s, d) < threshold)
        .count()
}

fn draw_samples<R: Rng + ?Sized>(rng: &mut R, n: usize, iterations: usize) -> Vec<[usize; 4]> {
    (0..iterations)
        .map(|_| {
            let idx = rand::seq::index::sample(rng, n, MIN_CORRESPONDENCES);
            [idx.index(0), idx.index(1), idx.index(2), idx.index(3)]
        })
        .collect()
}

fn is_collinear(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2]) -> bool {
    let (ax, ay) = (p1[0] - p0[0], p1[1] - p0[1]);
    let (bx, by) = (p2[0] - p0[0], p2[1] - p0[1]);
    let area = ax * by - ay * bx;
    area.abs() <= COLLINEAR_SINE * ax.hypot(ay) * bx.hypot(by)
}

/// A minimal sample is degenerate when any three of its four points are
/// collinear (coincident points included); the DLT null space is then not
/// one-dimensional and the fitted matrix is arbitrary.
fn is_degenerate_sample(pts: &[[f64; 2]; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES
        .iter()
        .any(|&[a, b, c]| is_collinear(pts[a], pts[b], pts[c]))
}

fn evaluate(
    iteration: usize,
    sample: &[usize; 4],
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    threshold: f64,
    deadline: Option<Instant>,
) -> Option<Hypothesis> {
    if deadline.is_some_and(|d| Instant::now() >= d) {
        return None;
    }
    let s4 = sample.map(|i| src[i]);
    let d4 = sample.map(|i| dst[i]);
    if is_degenerate_sample(&s4) || is_degenerate_sample(&d4) {
        return None;
    }
    let matrix = fit_homography(&s4, &d4)?;
    Some(Hypothesis {
        iteration,
        inliers: count_inliers(&matrix, src, dst, threshold),
        matrix,
    })
}

#[cfg_attr(all(feature = "parallel", not(test)), allow(dead_code))]
fn score_serial(
    samples: &[[usize; 4]],
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    threshold: f64,
    deadline: Option<Instant>,
) -> Vec<Option<Hypothesis>> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| evaluate(i, s, src, dst, threshold, deadline))
        .collect()
}

#[cfg(feature = "parallel")]
fn score_parallel(
    samples: &[[usize; 4]],
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    threshold: f64,
    deadline: Option<Instant>,
) -> Vec<Option<Hypothesis>> {
    samples
        .par_iter()
        .enumerate()
        .map(|(i, s)| evaluate(i, s, src, dst, threshold, deadline))
        .collect()
}

/// Robustly fit `H` with `dst ≈ H·src` using `rng` for sampling.
pub fn estimate_points_with_rng<R: Rng + ?Sized>(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    options: &RansacOptions,
    rng: &mut R,
) -> Result<Homography, HomographyError> {
    let n = src.len();
    if n < MIN_CORRESPONDENCES || dst.len() != n {
        return Err(HomographyError::InvalidHomography);
    }
    let threshold = options.reprojection_threshold;
    let deadline = options
        .time_budget_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let samples = draw_samples(rng, n, options.iterations);

    #[cfg(feature = "parallel")]
    let hypotheses = score_parallel(&samples, src, dst, threshold, deadline);
    #[cfg(not(feature = "parallel"))]
    let hypotheses = score_serial(&samples, src, dst, threshold, deadline);

    let evaluated = hypotheses.iter().filter(|h| h.is_some()).count();
    let best = hypotheses
        .into_iter()
        .flatten()
        .fold(None::<Hypothesis>, |best, h| match best {
            Some(b) if b.inliers >= h.inliers => Some(b),
            _ => Some(h),
        })
        .ok_or(HomographyError::InvalidHomography)?;
    debug!(
        "ransac: {} matches, {}/{} usable hypotheses, best iteration {} with {} inliers",
        n, evaluated, options.iterations, best.iteration, best.inliers
    );

    let sample_inliers = inlier_indices(&best.matrix, src, dst, threshold);
    let refit = {
        let s: Vec<[f64; 2]> = sample_inliers.iter().map(|&i| src[i]).collect();
        let d: Vec<[f64; 2]> = sample_inliers.iter().map(|&i| dst[i]).collect();
        fit_homography(&s, &d)
    };
    let (matrix, inliers) = match refit {
        Some(h) => {
            let refined = inlier_indices(&h, src, dst, threshold);
            if refined.len() >= sample_inliers.len() {
                (h, refined)
            } else {
                warn!(
                    "ransac: refit lost inliers ({} -> {}), keeping sample model",
                    sample_inliers.len(),
                    refined.len()
                );
                (best.matrix, sample_inliers)
            }
        }
        None => {
            warn!("ransac: refit on {} inliers failed, keeping sample model", sample_inliers.len());
            (best.matrix, sample_inliers)
        }
    };

    let ratio = inliers.len() as f64 / n as f64;
    if ratio < options.inlier_ratio_threshold {
        return Err(HomographyError::InsufficientInliers {
            inliers: inliers.len(),
            total: n,
            required_ratio: options.inlier_ratio_threshold,
        });
    }
    let determinant = matrix.determinant();
    let [min, max] = options.determinant_bounds;
    if !(min..=max).contains(&determinant) {
        return Err(HomographyError::DeterminantOutOfRange {
            determinant,
            min,
            max,
        });
    }

    Ok(Homography {
        matrix,
        inliers,
        total_matches: n,
    })
}

/// Estimate the homography mapping query positions onto train positions
/// (input-image coordinates) with an injected RNG.
pub fn estimate_homography_with_rng<R: Rng + ?Sized>(
    matches: &[FeatureMatch<'_>],
    options: &RansacOptions,
    rng: &mut R,
) -> Result<Homography, HomographyError> {
    let (src, dst): (Vec<[f64; 2]>, Vec<[f64; 2]>) = matches
        .iter()
        .map(|m| {
            let ((qx, qy), (tx, ty)) = m.positions();
            ([qx, qy], [tx, ty])
        })
        .unzip();
    estimate_points_with_rng(&src, &dst, options, rng)
}

/// Estimate with a `StdRng` seeded from `options.seed`.
pub fn estimate_homography(
    matches: &[FeatureMatch<'_>],
    options: &RansacOptions,
) -> Result<Homography, HomographyError> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    estimate_homography_with_rng(matches, options, &mut rng)
}

/// Point-based counterpart of [`estimate_homography`].
pub fn estimate_points(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    options: &RansacOptions,
) -> Result<Homography, HomographyError> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    estimate_points_with_rng(src, dst, options, &mut rng)
}
