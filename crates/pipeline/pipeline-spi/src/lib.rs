//! Pipeline Service Provider Interface
//!
//! Defines the payload variants that flow between preprocessing stages and
//! the contract every stage implements.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::Stage;
pub use error::{PipelineError, Result};
pub use model::{Payload, Rank, WindowSet};
