//! Training progress counters

use serde::{Deserialize, Serialize};

/// Where an interrupted training run resumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingProgress {
    /// Current round; also drives the learning-rate schedule
    pub epoch_index: usize,
    /// Next batch within the current round
    pub batch_index: usize,
    /// Batches trained since the last selection; warm start when positive
    pub round_count: usize,
}

impl TrainingProgress {
    pub fn is_warm(&self) -> bool {
        self.round_count > 0
    }
}
