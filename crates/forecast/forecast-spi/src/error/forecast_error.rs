//! Forecast error types

use pipeline_spi::PipelineError;
use recurrent_spi::RecurrentError;
use thiserror::Error;

/// Errors that can occur during training, validation or prediction
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Input that cannot be trained on: empty, all missing or unparseable
    #[error("Invalid data: {0}")]
    Data(String),

    /// Too large a share of the training data is missing
    #[error("Too many missing values: {missing:.0}% of {total} points")]
    TooManyMissing { missing: f64, total: usize },

    /// Mismatched lengths between ensembles, segments or windows
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Saved state could not be read or written
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// One of the concurrent training tasks failed
    #[error("{task} task failed: {reason}")]
    TaskFailed { task: String, reason: String },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Recurrent(#[from] RecurrentError),
}

impl ForecastError {
    /// Whether the error signals a wiring bug rather than bad input
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            ForecastError::Shape(_)
                | ForecastError::Pipeline(PipelineError::LengthMismatch { .. })
                | ForecastError::Pipeline(PipelineError::RankMismatch { .. })
                | ForecastError::Pipeline(PipelineError::StageOrder { .. })
                | ForecastError::Recurrent(RecurrentError::Shape { .. })
                | ForecastError::Recurrent(RecurrentError::VariantMismatch { .. })
        )
    }
}
