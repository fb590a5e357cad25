//! Forecast Facade
//!
//! High-level API for the LSTM forecaster. Re-exports all public types
//! from the forecast stack for convenient usage.

// Re-export everything from API (which includes SPI and core)
pub use forecast_api::*;

// Explicit re-exports for documentation
pub use forecast_api::prelude;

// Re-export core modules for direct access
pub use forecast_core::{early_stopping, iterations, predictor, preprocess, trainer, validator};

// Persisted model types and the state store contract
pub use forecast_spi::{contract, model};

/// Preprocessing stages and the stage pipeline
pub mod pipeline {
    pub use pipeline_api::*;
}

/// Recurrent unit, network and optimizer
pub mod recurrent {
    pub use recurrent_api::*;
}
