//! Model module containing parameter containers

mod gate_variant;
mod gate_weights;
mod weight_set;

pub use gate_variant::GateVariant;
pub use gate_weights::{GateWeights, Parameter};
pub use weight_set::{ForgetWeights, WeightSet};
