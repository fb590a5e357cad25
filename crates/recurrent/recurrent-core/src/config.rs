//! Network configuration

use recurrent_spi::{GateVariant, RecurrentError, Result};
use serde::{Deserialize, Serialize};

/// Settings for one network training call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Unit variant
    pub variant: GateVariant,
    /// Step size handed to the optimizer
    pub learning_rate: f64,
    /// Inverted dropout rate during training
    pub dropout: f64,
    /// Seed for dropout masks; entropy when absent
    pub seed: Option<u64>,
}

impl NetworkConfig {
    pub fn new(variant: GateVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(RecurrentError::InvalidParameter {
                name: "dropout".to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(RecurrentError::InvalidParameter {
                name: "learning_rate".to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            variant: GateVariant::ForgetGated,
            learning_rate: 0.02,
            dropout: 0.2,
            seed: None,
        }
    }
}
