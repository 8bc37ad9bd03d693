// src/error.rs

use thiserror::Error;

/// Rejected input, raised before any kernel evaluation.
///
/// `field` names the offending parameter, e.g. `grid.size_x` or
/// `antennas[1].thickness`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a positive integer, got {value}")]
    NonPositiveCount { field: String, value: usize },

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: String, value: f64 },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field} could not be parsed as a number: {raw:?}")]
    NotANumber { field: String, raw: String },

    #[error("{field} has unrecognised value {raw:?}")]
    Unrecognised { field: String, raw: String },

    #[error("at least one antenna is required")]
    NoAntennas,

    #[error("working grid needs {side} nodes per axis, limit is {limit}")]
    WorkingGridTooLarge { side: usize, limit: usize },
}

impl ValidationError {
    /// Name of the rejected parameter, if the error concerns a single one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NonPositiveCount { field, .. }
            | Self::NonFinite { field, .. }
            | Self::NonPositive { field, .. }
            | Self::Negative { field, .. }
            | Self::NotANumber { field, .. }
            | Self::Unrecognised { field, .. } => Some(field.as_str()),
            Self::NoAntennas | Self::WorkingGridTooLarge { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("slice index {step} out of range for n_z = {n_z}")]
    StepOutOfRange { step: usize, n_z: usize },

    #[error("renderer failed on slice {step}: {source}")]
    Render {
        step: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Finite check shared by the grid and antenna validators.
pub(crate) fn check_finite(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite {
            field: field.to_string(),
            value,
        })
    }
}

pub(crate) fn check_positive(field: &str, value: f64) -> Result<f64, ValidationError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<f64, ValidationError> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        })
    }
}
