//! Contract module containing trait definitions for weight updates

mod learning_rate_schedule;
mod optimizer;

pub use learning_rate_schedule::LearningRateSchedule;
pub use optimizer::Optimizer;
