//! Forecast Core
//!
//! Trains trend and seasonality ensembles, rolls them forward for
//! prediction and scores candidates against held-out data.

pub mod early_stopping;
pub mod iterations;
pub mod predictor;
pub mod preprocess;
pub mod trainer;
pub mod validator;

// Re-export SPI types for implementations
pub use forecast_spi::{
    ForecastError, HyperParameters, ModelEnsemble, ModelRegistry, ModelState, Result, StateStore,
    TrainingProgress,
};

pub use early_stopping::{EarlyStopping, StoppingDecision};
pub use iterations::dynamic_iterations;
pub use predictor::{predict_seasonality, predict_trend, Forecast, Predictor};
pub use preprocess::{calendar, correct, correction_pipeline, scale_range};
pub use trainer::ModelTrainer;
pub use validator::{Validation, Validator};
