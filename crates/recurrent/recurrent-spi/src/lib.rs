//! Recurrent Service Provider Interface
//!
//! Defines the parameter containers shared by training and inference and the
//! traits optimizers and learning-rate schedules implement.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{LearningRateSchedule, Optimizer};
pub use error::{RecurrentError, Result};
pub use model::{ForgetWeights, GateVariant, GateWeights, Parameter, WeightSet};
