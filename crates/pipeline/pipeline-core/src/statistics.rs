//! Series statistics and error metrics

use pipeline_spi::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Stand-in standard deviation used when a series has zero variance
pub const MIN_STD_DEV: f64 = 1e-15;

/// Arithmetic mean, NaN for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation, NaN for an empty slice
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// Pairs of (actual, predicted) where both values are finite
fn finite_pairs(actual: &[f64], predicted: &[f64]) -> Result<Vec<(f64, f64)>> {
    if actual.len() != predicted.len() {
        return Err(PipelineError::LengthMismatch {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    let pairs: Vec<(f64, f64)> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a.is_finite() && p.is_finite())
        .map(|(a, p)| (*a, *p))
        .collect();
    if pairs.is_empty() {
        return Err(PipelineError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(pairs)
}

/// Mean squared error over the pairs where both values are present
pub fn mse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    let pairs = finite_pairs(actual, predicted)?;
    Ok(pairs.iter().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / pairs.len() as f64)
}

/// Root-mean-square error; ranks candidate ensembles during validation
pub fn rms(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    mse(actual, predicted).map(f64::sqrt)
}

/// Mean absolute error
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    let pairs = finite_pairs(actual, predicted)?;
    Ok(pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / pairs.len() as f64)
}

/// Mean and standard deviation for z-score normalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZStats {
    mean: f64,
    std_dev: f64,
}

impl ZStats {
    /// Build from known moments; a zero or non-finite deviation is replaced
    /// with [`MIN_STD_DEV`].
    pub fn new(mean: f64, std_dev: f64) -> Self {
        let std_dev = if std_dev.is_finite() && std_dev > 0.0 {
            std_dev
        } else {
            MIN_STD_DEV
        };
        Self { mean, std_dev }
    }

    /// Compute from the finite values of `data`
    pub fn from_values(data: &[f64]) -> Result<Self> {
        let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(PipelineError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        Ok(Self::new(mean(&finite), std_dev(&finite)))
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Whether the deviation was substituted for a zero-variance input
    pub fn is_degenerate(&self) -> bool {
        self.std_dev == MIN_STD_DEV
    }

    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }

    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.std_dev + self.mean
    }
}

impl Default for ZStats {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}
