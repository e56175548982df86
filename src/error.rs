//! Error types for xStream.

use thiserror::Error;

/// xStream error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XStreamError {
    /// A configuration value that cannot build a model
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Input width differs from the configured dimensionality
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// NaN or infinite feature value
    #[error("non-finite value at feature {index}")]
    NonFiniteInput { index: usize },
}

impl XStreamError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for xStream operations.
pub type Result<T> = std::result::Result<T, XStreamError>;

/// Check that `x` has width `dim` and holds only finite values.
pub(crate) fn check_input(x: &[f64], dim: usize) -> Result<()> {
    if x.len() != dim {
        return Err(XStreamError::DimensionMismatch {
            expected: dim,
            got: x.len(),
        });
    }
    match x.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(XStreamError::NonFiniteInput { index }),
        None => Ok(()),
    }
}
