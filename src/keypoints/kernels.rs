//! Derivative operators on a single DoG layer.
//!
//! - Second-order Sobel operators (3×3 or 5×5) for the spatial Hessian block:
//!   a second-difference kernel along one axis combined with a binomial
//!   smoothing kernel along the other, plus a first-difference outer product
//!   for the mixed term. Kernels are normalised so that a quadratic surface
//!   yields its exact second derivatives.
//! - Central differences for the first-order gradient.
//!
//! All reads go through `ImageF32::get_reflected`, so evaluating a kernel at
//! the image border never needs special-casing.
use crate::image::ImageF32;

/// Spatial second-derivative strategy injected into the keypoint refiner.
pub trait DerivativeKernel: Send + Sync {
    /// Side length of the square support.
    fn size(&self) -> usize;
    /// `∂²I/∂x²` at `(x, y)`.
    fn dxx(&self, img: &ImageF32, x: isize, y: isize) -> f32;
    /// `∂²I/∂y²` at `(x, y)`.
    fn dyy(&self, img: &ImageF32, x: isize, y: isize) -> f32;
    /// `∂²I/∂x∂y` at `(x, y)`.
    fn dxy(&self, img: &ImageF32, x: isize, y: isize) -> f32;
}

/// Separable Sobel-style kernel built from static taps.
#[derive(Clone, Copy, Debug)]
pub struct SobelKernel {
    smooth: &'static [f32],
    second: &'static [f32],
    first: &'static [f32],
    second_norm: f32,
    cross_norm: f32,
}

impl SobelKernel {
    pub const fn new(
        smooth: &'static [f32],
        second: &'static [f32],
        first: &'static [f32],
        second_norm: f32,
        cross_norm: f32,
    ) -> Self {
        Self {
            smooth,
            second,
            first,
            second_norm,
            cross_norm,
        }
    }

    /// Kernel for a supported size (3 or 5).
    pub fn for_size(size: usize) -> Option<&'static SobelKernel> {
        match size {
            3 => Some(&SOBEL_3X3),
            5 => Some(&SOBEL_5X5),
            _ => None,
        }
    }

    #[inline]
    fn correlate(
        img: &ImageF32,
        x: isize,
        y: isize,
        along_x: &[f32],
        along_y: &[f32],
    ) -> f32 {
        let r = (along_x.len() / 2) as isize;
        let mut acc = 0.0f32;
        for (j, &ky) in along_y.iter().enumerate() {
            if ky == 0.0 {
                continue;
            }
            let yy = y + j as isize - r;
            let mut row_acc = 0.0f32;
            for (i, &kx) in along_x.iter().enumerate() {
                if kx != 0.0 {
                    row_acc += kx * img.get_reflected(x + i as isize - r, yy);
                }
            }
            acc += ky * row_acc;
        }
        acc
    }
}

impl DerivativeKernel for SobelKernel {
    fn size(&self) -> usize {
        self.smooth.len()
    }

    fn dxx(&self, img: &ImageF32, x: isize, y: isize) -> f32 {
        Self::correlate(img, x, y, self.second, self.smooth) / self.second_norm
    }

    fn dyy(&self, img: &ImageF32, x: isize, y: isize) -> f32 {
        Self::correlate(img, x, y, self.smooth, self.second) / self.second_norm
    }

    fn dxy(&self, img: &ImageF32, x: isize, y: isize) -> f32 {
        Self::correlate(img, x, y, self.first, self.first) / self.cross_norm
    }
}

/// `[1,-2,1] ⊗ [1,2,1] / 4` and `[-1,0,1] ⊗ [-1,0,1] / 4`.
pub const SOBEL_3X3: SobelKernel = SobelKernel::new(
    &[1.0, 2.0, 1.0],
    &[1.0, -2.0, 1.0],
    &[-1.0, 0.0, 1.0],
    4.0,
    4.0,
);

/// `[1,0,-2,0,1] ⊗ [1,4,6,4,1] / 64` and `[-1,-2,0,2,1] ⊗ [-1,-2,0,2,1] / 64`.
pub const SOBEL_5X5: SobelKernel = SobelKernel::new(
    &[1.0, 4.0, 6.0, 4.0, 1.0],
    &[1.0, 0.0, -2.0, 0.0, 1.0],
    &[-1.0, -2.0, 0.0, 2.0, 1.0],
    64.0,
    64.0,
);

/// Central-difference gradient `(∂I/∂x, ∂I/∂y)`.
#[inline]
pub fn central_gradient(img: &ImageF32, x: isize, y: isize) -> (f32, f32) {
    let gx = 0.5 * (img.get_reflected(x + 1, y) - img.get_reflected(x - 1, y));
    let gy = 0.5 * (img.get_reflected(x, y + 1) - img.get_reflected(x, y - 1));
    (gx, gy)
}
