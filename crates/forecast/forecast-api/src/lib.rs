//! Forecast Consumer API
//!
//! Entry points for training and serving the LSTM forecaster:
//! - [`TrainingConfig`] for run settings that are not persisted
//! - [`TrainingDriver`] with `train` and `train_once`
//! - [`FileStateStore`] and [`MemoryStateStore`] snapshot stores
//! - Re-exports from SPI and core for convenience

pub mod config;
pub mod data;
pub mod driver;
pub mod store;

// Re-export from core
pub use forecast_core::{
    calendar, correct, dynamic_iterations, predict_seasonality, predict_trend, scale_range,
    EarlyStopping, Forecast, ModelTrainer, Predictor, StoppingDecision, Validation, Validator,
};

// Re-export from SPI
pub use forecast_spi::{
    ForecastError, HyperParameters, ModelEnsemble, ModelRegistry, ModelState, Result, StateStore,
    TrainingProgress,
};

pub use config::TrainingConfig;
pub use data::{prepare, PreparedData};
pub use driver::{TrainingDriver, TrainingReport};
pub use store::{decode_snapshot, encode_snapshot, FileStateStore, MemoryStateStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        predict_seasonality, predict_trend, FileStateStore, Forecast, ForecastError,
        HyperParameters, MemoryStateStore, ModelState, Result, StateStore, TrainingConfig,
        TrainingDriver, TrainingReport,
    };
}
