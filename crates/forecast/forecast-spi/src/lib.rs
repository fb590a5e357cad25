//! Forecast Service Provider Interface
//!
//! Defines the persistent model state, its hyperparameters and the storage
//! contract used by training and prediction.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::StateStore;
pub use error::{ForecastError, Result};
pub use model::{HyperParameters, ModelEnsemble, ModelRegistry, ModelState, TrainingProgress};

// Weight types carried by every ensemble
pub use recurrent_spi::{GateVariant, WeightSet};
