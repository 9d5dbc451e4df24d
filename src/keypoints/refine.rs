//! Candidate filtering and sub-pixel localisation.
//!
//! For each raw extremum the refiner
//! 1. evaluates the `(x, y, s)` Hessian: spatial block from the injected
//!    [`DerivativeKernel`], scale row/column from central differences across
//!    the three layers;
//! 2. rejects candidates whose 2×2 spatial block is indefinite, has a negative
//!    discriminant, too small an eigenvalue product, or an edge-like curvature
//!    ratio;
//! 3. solves `(H + λI)·δ = −∇D` and applies only the spatial part of `δ`;
//! 4. rejects offsets that leave the pixel or whose interpolated contrast
//!    change `|δ·∇D|` reaches the contrast threshold;
//! 5. describes the integer location on the current layer.
use super::descriptor::GradientWindow;
use super::kernels::{central_gradient, DerivativeKernel};
use super::options::KeypointOptions;
use super::types::{Keypoint, OctaveSlice, PixelPoint};

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Why a candidate was dropped. Rejections are ordinary filtering outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    /// Non-positive spatial determinant or eigenvalue product below threshold.
    LowContrast,
    /// Principal curvature ratio above the edge threshold.
    EdgeResponse,
    /// Spatial offset longer than `offset_magnitude_threshold`.
    OffsetTooLarge,
    /// `|offset · gradient|` at or above the contrast threshold.
    InterpolatedContrast,
    /// Negative discriminant or a linear system that could not be solved.
    Degenerate,
}

/// Local derivatives of the DoG at a candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalDerivatives {
    pub hessian: Matrix3<f32>,
    pub gradient: Vector3<f32>,
}

/// Refiner holding the options and the derivative kernel strategy.
pub struct KeypointRefiner<'a> {
    options: &'a KeypointOptions,
    kernel: &'a dyn DerivativeKernel,
    edge_threshold: f32,
}

impl<'a> KeypointRefiner<'a> {
    pub fn new(options: &'a KeypointOptions, kernel: &'a dyn DerivativeKernel) -> Self {
        Self {
            options,
            kernel,
            edge_threshold: options.edge_threshold(),
        }
    }

    pub fn derivatives(&self, slice: &OctaveSlice<'_>, at: PixelPoint) -> LocalDerivatives {
        let (x, y) = (at.col as isize, at.row as isize);
        let cur = slice.current;
        let hxx = self.kernel.dxx(cur, x, y);
        let hyy = self.kernel.dyy(cur, x, y);
        let hxy = self.kernel.dxy(cur, x, y);
        let hss = slice.sample(1, x, y) - 2.0 * slice.sample(0, x, y) + slice.sample(-1, x, y);
        let hxs = 0.25
            * (slice.sample(1, x + 1, y) - slice.sample(1, x - 1, y)
                - slice.sample(-1, x + 1, y)
                + slice.sample(-1, x - 1, y));
        let hys = 0.25
            * (slice.sample(1, x, y + 1) - slice.sample(1, x, y - 1)
                - slice.sample(-1, x, y + 1)
                + slice.sample(-1, x, y - 1));

        let (gx, gy) = central_gradient(cur, x, y);
        let gs = 0.5 * (slice.sample(1, x, y) - slice.sample(-1, x, y));

        LocalDerivatives {
            hessian: Matrix3::new(hxx, hxy, hxs, hxy, hyy, hys, hxs, hys, hss),
            gradient: Vector3::new(gx, gy, gs),
        }
    }

    fn check_curvature(&self, h: &Matrix3<f32>) -> Result<(), Rejection> {
        let (hxx, hyy, hxy) = (h[(0, 0)], h[(1, 1)], h[(0, 1)]);
        let trace = hxx + hyy;
        let det = hxx * hyy - hxy * hxy;
        // trace² − 4·det, written in a form that cannot round below zero for
        // a symmetric block.
        let discriminant = (hxx - hyy) * (hxx - hyy) + 4.0 * hxy * hxy;
        if !discriminant.is_finite() {
            return Err(Rejection::Degenerate);
        }
        let root = discriminant.sqrt();
        let (l1, l2) = (0.5 * (trace + root), 0.5 * (trace - root));
        if det <= 0.0 || l1 * l2 < self.options.contrast_threshold {
            return Err(Rejection::LowContrast);
        }
        if trace * trace / det > self.edge_threshold {
            return Err(Rejection::EdgeResponse);
        }
        Ok(())
    }

    /// Spatial sub-pixel offset `(dx, dy)` from the regularised 3×3 solve.
    fn solve_offset(&self, d: &LocalDerivatives) -> Result<(f32, f32), Rejection> {
        let reg = self.options.hessian_regularization as f64;
        let h: Matrix3<f64> = d.hessian.cast::<f64>() + Matrix3::identity() * reg;
        let rhs: Vector3<f64> = -d.gradient.cast::<f64>();
        let sol = h.lu().solve(&rhs).ok_or(Rejection::Degenerate)?;
        if !sol.iter().all(|v| v.is_finite()) {
            return Err(Rejection::Degenerate);
        }
        Ok((sol[0] as f32, sol[1] as f32))
    }

    /// Refine `candidate`, reporting the reason when it is dropped.
    pub fn evaluate(
        &self,
        slice: &OctaveSlice<'_>,
        candidate: PixelPoint,
    ) -> Result<Keypoint, Rejection> {
        let d = self.derivatives(slice, candidate);
        self.check_curvature(&d.hessian)?;

        let (ox, oy) = self.solve_offset(&d)?;
        if ox.hypot(oy) > self.options.offset_magnitude_threshold {
            return Err(Rejection::OffsetTooLarge);
        }
        let contrast_change = ox * d.gradient[0] + oy * d.gradient[1];
        if contrast_change.abs() >= self.options.contrast_threshold {
            return Err(Rejection::InterpolatedContrast);
        }

        let window = GradientWindow::extract(
            slice.current,
            candidate.col,
            candidate.row,
            self.options.descriptor_window_size,
        );
        Ok(Keypoint::new(
            slice.octave,
            slice.scale_index,
            candidate.col as f32 + ox,
            candidate.row as f32 + oy,
            slice.octave_scale,
            window.descriptor(),
        ))
    }

    /// Refine `candidate`; `None` when any filter rejects it.
    pub fn refine(&self, slice: &OctaveSlice<'_>, candidate: PixelPoint) -> Option<Keypoint> {
        self.evaluate(slice, candidate).ok()
    }
}
