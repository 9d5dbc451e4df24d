use super::kernels::SobelKernel;
use crate::error::{ensure_in_range, ensure_positive, ConfigError};

use serde::{Deserialize, Serialize};

/// Options for extrema search, refinement and description.
///
/// Contrast-related thresholds are expressed in DoG units of an input with
/// nominal 0–255 intensities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypointOptions {
    /// Minimum product of the spatial Hessian eigenvalues; also the bound on
    /// the interpolated contrast change `|offset · gradient|`.
    pub contrast_threshold: f32,
    /// Principal curvature ratio `r` of the edge test
    /// `trace² / det > (r + 1)² / r`.
    pub edge_response_ratio: f32,
    /// Maximum length of the spatial sub-pixel offset.
    pub offset_magnitude_threshold: f32,
    /// Spatial second-derivative kernel size (3 or 5).
    pub sobel_kernel_size: usize,
    /// Side of the square gradient window fed to the descriptor; a positive
    /// multiple of 4.
    pub descriptor_window_size: usize,
    /// Half-width of the extrema comparison window.
    pub extrema_radius: usize,
    /// Added to the Hessian diagonal before the sub-pixel solve.
    pub hessian_regularization: f32,
}

impl Default for KeypointOptions {
    fn default() -> Self {
        Self {
            contrast_threshold: 0.03,
            edge_response_ratio: 10.0,
            offset_magnitude_threshold: 0.55,
            sobel_kernel_size: 3,
            descriptor_window_size: 16,
            extrema_radius: 1,
            hessian_regularization: 1e-6,
        }
    }
}

impl KeypointOptions {
    pub fn with_sobel_kernel_size(mut self, size: usize) -> Self {
        self.sobel_kernel_size = size;
        self
    }

    pub fn with_contrast_threshold(mut self, threshold: f32) -> Self {
        self.contrast_threshold = threshold;
        self
    }

    /// Derivative kernel selected by `sobel_kernel_size`.
    pub fn derivative_kernel(&self) -> Result<&'static SobelKernel, ConfigError> {
        SobelKernel::for_size(self.sobel_kernel_size)
            .ok_or(ConfigError::InvalidKernelSize(self.sobel_kernel_size))
    }

    /// Right-hand side of the edge test, `(r + 1)² / r`.
    pub fn edge_threshold(&self) -> f32 {
        let r = self.edge_response_ratio;
        (r + 1.0) * (r + 1.0) / r
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("contrast_threshold", self.contrast_threshold as f64)?;
        ensure_positive("edge_response_ratio", self.edge_response_ratio as f64)?;
        ensure_positive(
            "offset_magnitude_threshold",
            self.offset_magnitude_threshold as f64,
        )?;
        self.derivative_kernel()?;
        if self.descriptor_window_size == 0 || self.descriptor_window_size % 4 != 0 {
            return Err(ConfigError::InvalidWindowSize(self.descriptor_window_size));
        }
        ensure_in_range("extrema_radius", self.extrema_radius as f64, 1.0, 16.0)?;
        ensure_in_range(
            "hessian_regularization",
            self.hessian_regularization as f64,
            0.0,
            1.0,
        )
    }
}
