//! Error module containing error types and result aliases

mod recurrent_error;

pub use recurrent_error::RecurrentError;

/// Result type for recurrent engine operations
pub type Result<T> = std::result::Result<T, RecurrentError>;
