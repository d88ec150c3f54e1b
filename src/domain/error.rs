//! Analysis Errors
//!
//! Precondition failures raised by the band computation and the
//! classification rules before any result is produced.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: requires {required} points with bands, got {available}")]
    InsufficientData { required: usize, available: usize },
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
