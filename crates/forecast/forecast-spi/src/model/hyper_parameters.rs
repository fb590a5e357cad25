//! Hyperparameters of the trend and seasonality models

use crate::error::{ForecastError, Result};
use recurrent_spi::{GateVariant, GateWeights};
use serde::{Deserialize, Serialize};

/// Hyperparameters persisted with every model.
///
/// Missing fields in a saved snapshot or config file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperParameters {
    /// Learning rate at the first round
    pub learning_rate_max: f64,
    /// Learning rate reached at the round budget
    pub learning_rate_min: f64,
    /// Fresh-init constants for every gate weight
    pub initial_weights: GateWeights,
    /// Hidden state seeding fresh weights and every inference pass
    pub initial_y: f64,
    /// Cell state seeding fresh weights and every inference pass
    pub initial_c: f64,
    /// Grid interval in minutes
    pub interval_minutes: u32,
    /// Shift applied before time-of-day bucketing
    pub utc_offset_minutes: i32,
    /// Batches per round
    pub batch_size: usize,
    /// Round budget
    pub epochs: usize,
    /// Trend horizon and trend segment count
    pub trend_points: usize,
    pub window_size_seasonality: usize,
    pub window_size_trend: usize,
    /// Epochs per network training call
    pub gd_iterations: usize,
    /// Divisor giving the lowest dynamic iteration count
    pub max_iteration_factor: usize,
    pub scaling_min: f64,
    pub scaling_max: f64,
    pub moving_average_window: usize,
    pub outlier_multiplier: f64,
    pub dropout: f64,
    /// Rounds without improvement before training stops
    pub patience: usize,
    pub gate: GateVariant,
    pub seed: Option<u64>,
}

impl HyperParameters {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("batch_size", self.batch_size),
            ("trend_points", self.trend_points),
            ("window_size_seasonality", self.window_size_seasonality),
            ("window_size_trend", self.window_size_trend),
            ("max_iteration_factor", self.max_iteration_factor),
            ("moving_average_window", self.moving_average_window),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(name, "must be at least 1"));
        }
        if self.interval_minutes == 0 || 1440 % self.interval_minutes != 0 {
            return Err(invalid("interval_minutes", "must divide a day evenly"));
        }
        if !(self.scaling_max > self.scaling_min) {
            return Err(invalid("scaling_max", "must exceed scaling_min"));
        }
        if !(self.learning_rate_min >= 0.0 && self.learning_rate_max >= self.learning_rate_min) {
            return Err(invalid(
                "learning_rate_max",
                "need 0 <= learning_rate_min <= learning_rate_max",
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(invalid("dropout", "must be in [0, 1)"));
        }
        if !(self.outlier_multiplier > 0.0) {
            return Err(invalid("outlier_multiplier", "must be positive"));
        }
        Ok(())
    }

    /// Grid interval in seconds
    pub fn interval_seconds(&self) -> i64 {
        i64::from(self.interval_minutes) * 60
    }

    /// Number of seasonality segments
    pub fn buckets_per_day(&self) -> usize {
        (1440 / self.interval_minutes.max(1)) as usize
    }
}

fn invalid(name: &str, reason: &str) -> ForecastError {
    ForecastError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl Default for HyperParameters {
    fn default() -> Self {
        Self {
            learning_rate_max: 0.02,
            learning_rate_min: 0.00005,
            initial_weights: GateWeights {
                wf: 1.0,
                rf: 1.0,
                ..GateWeights::splat(0.2)
            },
            initial_y: 0.2,
            initial_c: 0.2,
            interval_minutes: 30,
            utc_offset_minutes: 0,
            batch_size: 1,
            epochs: 50,
            trend_points: 7,
            window_size_seasonality: 14,
            window_size_trend: 7,
            gd_iterations: 55,
            max_iteration_factor: 10,
            scaling_min: 0.0,
            scaling_max: 1000.0,
            moving_average_window: 3,
            outlier_multiplier: 1.5,
            dropout: 0.2,
            patience: 5,
            gate: GateVariant::ForgetGated,
            seed: None,
        }
    }
}
