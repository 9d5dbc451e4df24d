//! Homography estimation between matched keypoints.
//!
//! - `dlt`: Hartley-normalised DLT solved by SVD.
//! - `ransac`: seeded RANSAC over 4-point samples, a refit on the best
//!   inlier set, then the inlier-ratio and determinant gates.
//! - Projection helpers shared by both and by callers that want to apply the
//!   result.

pub mod dlt;
pub mod error;
pub mod options;
pub mod ransac;

pub use dlt::fit_homography;
pub use error::HomographyError;
pub use options::RansacOptions;
pub use ransac::{
    estimate_homography, estimate_homography_with_rng, estimate_points, estimate_points_with_rng,
};

use crate::matching::FeatureMatch;

use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

const EPS: f64 = 1e-12;

/// Accepted projective transform from query to train image coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Homography {
    /// Normalised so that `matrix[(2, 2)] == 1`.
    pub matrix: Matrix3<f64>,
    /// Indices into the match list the model was estimated from.
    pub inliers: Vec<usize>,
    pub total_matches: usize,
}

impl Homography {
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }

    pub fn inlier_ratio(&self) -> f64 {
        if self.total_matches == 0 {
            0.0
        } else {
            self.inliers.len() as f64 / self.total_matches as f64
        }
    }

    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    pub fn transform_point(&self, x: f64, y: f64) -> [f64; 2] {
        project(&self.matrix, x, y)
    }

    /// The inlier subset of `matches` (the list passed to estimation).
    pub fn inlier_matches<'a>(&self, matches: &[FeatureMatch<'a>]) -> Vec<FeatureMatch<'a>> {
        self.inliers
            .iter()
            .filter_map(|&i| matches.get(i).copied())
            .collect()
    }
}

/// `H·[x, y, 1]ᵀ` dehomogenised; NaN when the point maps to infinity.
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> [f64; 2] {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < EPS {
        return [f64::NAN, f64::NAN];
    }
    [p[0] / p[2], p[1] / p[2]]
}

/// Project every point; `None` if any lands at infinity or is not finite.
pub fn apply_homography_points(h: &Matrix3<f64>, pts: &[[f64; 2]]) -> Option<Vec<[f64; 2]>> {
    pts.iter()
        .map(|p| {
            let q = project(h, p[0], p[1]);
            (q[0].is_finite() && q[1].is_finite()).then_some(q)
        })
        .collect()
}

/// `‖project(H, src) − dst‖`; infinite for points mapped to infinity.
pub fn reprojection_error(h: &Matrix3<f64>, src: &[f64; 2], dst: &[f64; 2]) -> f64 {
    let p = project(h, src[0], src[1]);
    let err = (p[0] - dst[0]).hypot(p[1] - dst[1]);
    if err.is_nan() {
        f64::INFINITY
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn project_and_error() {
        let h = Matrix3::new(2.0, 0.0, 1.0, 0.0, 2.0, -1.0, 0.0, 0.0, 1.0);
        assert_eq!(project(&h, 1.0, 1.0), [3.0, 1.0]);
        assert_relative_eq!(reprojection_error(&h, &[1.0, 1.0], &[6.0, 5.0]), 5.0);
    }

    #[test]
    fn points_at_infinity_are_reported() {
        let h = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0);
        assert!(project(&h, 0.0, 3.0)[0].is_nan());
        assert!(apply_homography_points(&h, &[[1.0, 1.0], [0.0, 2.0]]).is_none());
        assert_eq!(reprojection_error(&h, &[0.0, 2.0], &[0.0, 0.0]), f64::INFINITY);
        let id = Matrix3::identity();
        assert_eq!(
            apply_homography_points(&id, &[[1.0, 2.0]]),
            Some(vec![[1.0, 2.0]])
        );
    }

    #[test]
    fn ratio_of_empty_model_is_zero() {
        let h = Homography {
            matrix: Matrix3::identity(),
            inliers: vec![],
            total_matches: 0,
        };
        assert_eq!(h.inlier_ratio(), 0.0);
        assert_eq!(h.determinant(), 1.0);
    }
}
