//! Structured errors for the regression and significance layers
//!
//! Errors are reserved for requests that are not meaningful at all (too few
//! points, a missing argument, no data). Degenerate numerics are resolved to
//! sentinel values by the callers and never surface here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
}

/// Error type for statistics operations
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum StatsError {
    #[error("{operation} requires at least {required} data points, got {actual}")]
    InsufficientData {
        operation: String,
        required: usize,
        actual: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Domain error: {0}")]
    Domain(String),
}

impl StatsError {
    // ========== Common Error Constructors ==========

    pub fn insufficient_data(operation: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            operation: operation.into(),
            required,
            actual,
        }
    }

    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::InvalidArgument(details.into())
    }

    pub fn div_zero(details: impl Into<String>) -> Self {
        Self::DivisionByZero(details.into())
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::Domain(details.into())
    }

    /// Machine-readable code, one of [`codes`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => codes::INSUFFICIENT_DATA,
            Self::InvalidArgument(_) => codes::INVALID_ARGUMENT,
            Self::DivisionByZero(_) => codes::DIV_ZERO,
            Self::Domain(_) => codes::DOMAIN_ERROR,
        }
    }

    /// Category name used where an error has to be rendered instead of raised
    pub fn category(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "InsufficientData",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::DivisionByZero(_) => "DivisionByZero",
            Self::Domain(_) => "Domain",
        }
    }

    /// Suggestion for fixing the error
    pub fn suggestion(&self) -> String {
        match self {
            Self::InsufficientData { required, .. } => {
                format!("Add observations until there are at least {}", required)
            }
            Self::InvalidArgument(_) => "Pass a present, well-formed argument".to_string(),
            Self::DivisionByZero(_) => "Add at least one observation first".to_string(),
            Self::Domain(_) => "Check the parameter range".to_string(),
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
