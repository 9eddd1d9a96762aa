// src/error.rs
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Custom error types for the fast-bsm library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BsmError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Text that does not name a contract type
    #[error("Unknown contract type '{value}': expected call or put")]
    ParseContractType { value: String },

    /// Evaluation time lies after the contract expiration
    #[error("Evaluation time {now} is after expiration {expiration}")]
    TimeOrderingViolation {
        expiration: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Implied volatility search ran out of iterations or time
    #[error(
        "Implied volatility did not converge after {iterations} iterations (last sigma = {last_sigma:.6}, residual = {residual:.3e})"
    )]
    NoConvergence {
        iterations: usize,
        last_sigma: f64,
        residual: f64,
    },

    /// Observed price cannot be reproduced by any volatility in range
    #[error(
        "Observed price {observed_price} outside attainable range [{lower:.6}, {upper:.6}]"
    )]
    OutOfDomain {
        observed_price: f64,
        lower: f64,
        upper: f64,
    },

    /// Invalid configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

/// Result type alias for fast-bsm operations
pub type BsmResult<T> = Result<T, BsmError>;

/// Validation utilities
pub mod validation {
    use super::{BsmError, BsmResult};

    /// Validate that a parameter is strictly positive and finite
    pub fn validate_positive(name: &str, value: f64) -> BsmResult<()> {
        if !(value > 0.0) || !value.is_finite() {
            Err(BsmError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0) and finite".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative and finite
    pub fn validate_non_negative(name: &str, value: f64) -> BsmResult<()> {
        if !(value >= 0.0) || !value.is_finite() {
            Err(BsmError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0) and finite".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> BsmResult<()> {
        if !(value >= min && value <= max) {
            Err(BsmError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> BsmResult<()> {
        if !value.is_finite() {
            Err(BsmError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
