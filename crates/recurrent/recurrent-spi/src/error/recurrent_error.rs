//! Recurrent engine error types

use crate::model::GateVariant;
use thiserror::Error;

/// Errors that can occur while building, training or running a network
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecurrentError {
    /// Vector or window lengths disagree
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    Shape {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A network needs at least one time step
    #[error("Input sequence is empty")]
    EmptySequence,

    /// Weights built for one unit variant were handed to the other
    #[error("Gate variant mismatch: expected {expected}, got {actual}")]
    VariantMismatch {
        expected: GateVariant,
        actual: GateVariant,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}
