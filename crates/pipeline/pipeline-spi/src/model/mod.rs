//! Model module containing payload data structures

mod payload;
mod rank;
mod window_set;

pub use payload::Payload;
pub use rank::Rank;
pub use window_set::WindowSet;
