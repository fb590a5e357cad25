//! Training run configuration

use forecast_spi::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Settings of a training run that are not persisted with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Name the state is stored under
    pub model_name: String,
    /// Share of the regularized series used for training; the rest is
    /// held out for validation
    pub train_split: f64,
    /// Largest missing share of the training portion that is still trained
    pub max_missing_ratio: f64,
    /// Keep only the trailing days of history
    pub history_days: Option<u32>,
    /// Smallest drop in combined RMS that counts as an improvement
    pub min_delta: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model_name: "default".to_string(),
            train_split: 0.66,
            max_missing_ratio: 0.5,
            history_days: None,
            min_delta: 0.0,
        }
    }
}

impl TrainingConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    pub fn with_history_days(mut self, days: Option<u32>) -> Self {
        self.history_days = days;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(invalid("model_name", "must not be empty"));
        }
        if !(self.train_split > 0.0 && self.train_split < 1.0) {
            return Err(invalid("train_split", "must be in (0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.max_missing_ratio) {
            return Err(invalid("max_missing_ratio", "must be in [0, 1]"));
        }
        if self.history_days == Some(0) {
            return Err(invalid("history_days", "must be at least 1"));
        }
        if !(self.min_delta >= 0.0) {
            return Err(invalid("min_delta", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> ForecastError {
    ForecastError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
