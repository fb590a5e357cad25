//! Recurrent engine implementations
//!
//! - [`Adagrad`]: per-parameter adaptive step sizes
//! - [`CosineAnnealing`]: learning rate decayed over the outer rounds
//! - [`SegmentTrainer`]: trains one segment's windows in sequence, each
//!   network warm-started from the previous one

mod adagrad;
mod cosine;
mod segment;

// Re-export from core
pub use recurrent_core::{
    forward_only, forward_trace, GateActivations, NetworkConfig, RecurrentNetwork,
    RecurrentUnit, TrainingOutcome,
};

// Re-export from SPI
pub use recurrent_spi::{
    ForgetWeights, GateVariant, GateWeights, LearningRateSchedule, Optimizer, Parameter,
    RecurrentError, Result, WeightSet,
};

pub use adagrad::Adagrad;
pub use cosine::CosineAnnealing;
pub use segment::{SegmentFit, SegmentTrainer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Adagrad, CosineAnnealing, SegmentFit, SegmentTrainer};
    pub use crate::{GateVariant, GateWeights, LearningRateSchedule, Optimizer, WeightSet};
    pub use crate::{NetworkConfig, RecurrentNetwork, TrainingOutcome};
    pub use crate::{RecurrentError, Result};
}
