//! Configuration validation errors.
//!
//! Every options struct exposes `validate()`; `FeaturePipeline::new` runs all
//! of them once so no stage ever sees an invalid parameter.

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter that must be strictly positive (and finite) was not.
    NonPositive { field: &'static str, value: f64 },
    /// A parameter fell outside its admissible interval.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// Derivative kernel size other than 3 or 5.
    InvalidKernelSize(usize),
    /// Descriptor window that is zero or not a multiple of 4.
    InvalidWindowSize(usize),
    /// RANSAC configured with zero iterations.
    ZeroIterations,
    /// A `[min, max]` pair with `min > max` or non-finite ends.
    InvalidBounds {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} must lie in [{min}, {max}], got {value}"),
            Self::InvalidKernelSize(size) => {
                write!(f, "sobel kernel size must be 3 or 5, got {size}")
            }
            Self::InvalidWindowSize(size) => write!(
                f,
                "descriptor window must be a positive multiple of 4, got {size}"
            ),
            Self::ZeroIterations => write!(f, "RANSAC requires at least one iteration"),
            Self::InvalidBounds { field, min, max } => {
                write!(f, "{field} bounds are invalid: [{min}, {max}]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Helper shared by the option validators.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn ensure_in_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
