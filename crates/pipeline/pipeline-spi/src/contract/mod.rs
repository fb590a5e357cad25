//! Contract module containing trait definitions for pipeline stages

mod stage;

pub use stage::Stage;
