//! Chained training over the windows of one segment

use crate::adagrad::Adagrad;
use pipeline_spi::WindowSet;
use recurrent_core::{NetworkConfig, RecurrentNetwork};
use recurrent_spi::{Result, WeightSet};

/// Result of training one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFit {
    /// Weights after the last window
    pub weights: WeightSet,
    /// Selected final-step error of the last window, if any window ran
    pub error: Option<f64>,
    /// Number of windows trained
    pub windows: usize,
}

/// Trains a segment's windows one after another.
///
/// Each window gets a fresh network and optimizer, initialized from the
/// weights selected for the previous window. A segment without windows
/// returns its initial weights untouched.
#[derive(Debug, Clone, Copy)]
pub struct SegmentTrainer {
    config: NetworkConfig,
    epochs: usize,
}

impl SegmentTrainer {
    pub fn new(config: NetworkConfig, epochs: usize) -> Self {
        Self { config, epochs }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn fit(&self, windows: &WindowSet, init: &WeightSet) -> Result<SegmentFit> {
        let mut current = init.clone();
        let mut error = None;
        for (i, (window, target)) in windows.pairs().enumerate() {
            let seed = self.config.seed.map(|s| s.wrapping_add(i as u64));
            let config = self.config.with_seed(seed);
            let mut network = RecurrentNetwork::new(config, window, target, &current, Adagrad::new())?;
            let outcome = network.train(self.epochs);
            current = outcome.weights;
            error = Some(outcome.error);
        }
        Ok(SegmentFit {
            weights: current,
            error,
            windows: windows.len(),
        })
    }
}
