//! Learning-rate schedule trait definition

/// Learning rate as a function of the outer training round
pub trait LearningRateSchedule: Send + Sync {
    /// Learning rate for `round`
    fn rate(&self, round: usize) -> f64;
}
