// src/error.rs
use thiserror::Error;

/// Custom error types for the sde-stepctl library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdeError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Numerical instability or convergence failure
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    /// A state vector handed to a controller has the wrong number of components
    #[error("State vector must have exactly {expected} components, got {found}")]
    StateShape { expected: usize, found: usize },

    /// Checkpoint times stored at a precision wider than the solver's time type
    #[error(
        "Precision mismatch: {field} is stored as {found}, wider than the {expected} time type; checkpoints would be rounded"
    )]
    PrecisionMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// Malformed checkpoint sequence
    #[error("Invalid checkpoint sequence at index {index}: {reason}")]
    InvalidCheckpoints { index: usize, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// The integration loop ran out of steps before reaching the end time
    #[error("Maximum number of steps ({max_steps}) reached at t = {t}")]
    MaxStepsReached { max_steps: usize, t: f64 },
}

/// Result type alias for sde-stepctl operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        }
    }

    /// Validate that a parameter is within a range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> SdeResult<()> {
        if value < min || value > max {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate correlation parameter
    pub fn validate_correlation(name: &str, rho: f64) -> SdeResult<()> {
        validate_range(name, rho, -1.0, 1.0)
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a state vector has exactly `expected` components
    pub fn validate_state_len(expected: usize, found: usize) -> SdeResult<()> {
        if found == expected {
            Ok(())
        } else {
            Err(SdeError::StateShape { expected, found })
        }
    }
}
