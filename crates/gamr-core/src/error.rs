//! Error types for risk scoring.

use thiserror::Error;

use crate::scale::RiskAxis;

/// Errors raised while validating or scoring risk inputs.
///
/// Each error is scoped to the record being scored; callers turn it into an
/// error response for that record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// An axis value lies outside its configured range.
    #[error("{axis} must be between {min} and {max}, got {value}")]
    Validation {
        axis: RiskAxis,
        value: i64,
        min: u32,
        max: u32,
    },

    /// A boundary field was present but not an integer.
    #[error("Field '{field}' must be an integer")]
    NotAnInteger { field: String },

    /// A boundary field was absent.
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// An axis scale cannot be used for scoring.
    #[error("Invalid scale for {axis}: {message}")]
    InvalidScale { axis: RiskAxis, message: String },

    /// An aggregation weight is negative or not finite.
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    /// A stored assessment disagrees with the axes it claims to score.
    #[error("Stored assessment for '{name}' does not match its axes")]
    InconsistentAssessment { name: String },

    /// An evaluation template is malformed.
    #[error("Invalid evaluation template: {0}")]
    InvalidTemplate(String),
}

impl ScoringError {
    /// Returns true for errors caused by the caller's input values.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScoringError::Validation { .. }
                | ScoringError::NotAnInteger { .. }
                | ScoringError::MissingField { .. }
                | ScoringError::InvalidWeight(_)
        )
    }
}

/// Convenience result alias for scoring operations.
pub type ScoringResult<T> = Result<T, ScoringError>;
