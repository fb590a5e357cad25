//! Recurrent Core
//!
//! The gated recurrent unit in both variants, the weight-tied network that
//! trains it through time, and the forward-only pass used for prediction.

pub mod activation;
pub mod config;
pub mod inference;
pub mod network;
pub mod unit;

pub use recurrent_spi::{
    ForgetWeights, GateVariant, GateWeights, LearningRateSchedule, Optimizer, Parameter,
    RecurrentError, Result, WeightSet,
};

pub use config::NetworkConfig;
pub use inference::{forward_only, forward_trace};
pub use network::{RecurrentNetwork, TrainingOutcome};
pub use unit::{GateActivations, RecurrentUnit};
