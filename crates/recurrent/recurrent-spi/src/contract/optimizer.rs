//! Optimizer trait definition

use crate::model::GateWeights;

/// Applies one gradient step to a set of tied gate weights.
///
/// Implementations may keep per-parameter state across calls, so one
/// optimizer instance belongs to exactly one network.
pub trait Optimizer: Send {
    /// Update `weights` in place from averaged `gradients`
    fn step(&mut self, weights: &mut GateWeights, gradients: &GateWeights, learning_rate: f64);

    /// Name of this optimizer
    fn name(&self) -> &str;
}
