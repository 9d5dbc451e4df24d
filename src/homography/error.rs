/// Failure of robust homography estimation, decided once after all RANSAC
/// iterations have run.
#[derive(Debug, Clone, PartialEq)]
pub enum HomographyError {
    /// Fewer than four matches, or no sample produced a usable matrix.
    InvalidHomography,
    /// Best model explains too small a share of the matches.
    InsufficientInliers {
        inliers: usize,
        total: usize,
        required_ratio: f64,
    },
    /// Final determinant outside the plausible range.
    DeterminantOutOfRange { determinant: f64, min: f64, max: f64 },
}

impl std::fmt::Display for HomographyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHomography => write!(f, "no usable homography could be estimated"),
            Self::InsufficientInliers {
                inliers,
                total,
                required_ratio,
            } => write!(
                f,
                "insufficient inliers: {inliers} of {total} matches, need ratio {required_ratio}"
            ),
            Self::DeterminantOutOfRange {
                determinant,
                min,
                max,
            } => write!(
                f,
                "homography determinant {determinant:.4} outside [{min}, {max}]"
            ),
        }
    }
}

impl std::error::Error for HomographyError {}
