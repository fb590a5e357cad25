//! Pipeline error types

use crate::model::Rank;
use thiserror::Error;

/// Errors raised while building or running a preprocessing pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A stage received a payload of a rank it does not accept
    #[error("Stage '{stage}' cannot accept a {actual} payload")]
    RankMismatch { stage: String, actual: Rank },

    /// A stage was attached after a stage whose output it cannot consume
    #[error("Stage '{stage}' cannot follow a stage producing a {produced} payload")]
    StageOrder { stage: String, produced: Rank },

    /// Two aligned sequences disagree in length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Every value of the series is missing
    #[error("Series contains no valid values")]
    AllMissing,

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}
