//! Outlier squash step

use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};
use serde::{Deserialize, Serialize};

struct Fences {
    lower: f64,
    upper: f64,
    median: f64,
    spread: f64,
}

fn fences(data: &[f64], multiplier: f64) -> Result<Fences> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(PipelineError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[3 * n / 4];
    let iqr = q3 - q1;
    Ok(Fences {
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
        median: sorted[n / 2],
        spread: iqr.max(1e-15),
    })
}

/// Indices of values outside the IQR fences
pub fn detect_outliers(data: &[f64], multiplier: f64) -> Result<Vec<usize>> {
    let f = fences(data, multiplier)?;
    Ok(data
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < f.lower || v > f.upper)
        .map(|(i, _)| i)
        .collect())
}

/// Compress outliers with a bounded nonlinearity.
///
/// Values outside `[q1 - k*iqr, q3 + k*iqr]` are replaced by
/// `median + iqr * tanh((v - median) / iqr)`; everything else passes
/// through. The length never changes.
///
/// @algorithm IQR
/// @category StatisticalDetector
/// @complexity O(n log n)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierSquash {
    multiplier: f64,
}

impl OutlierSquash {
    /// Create a new squash step
    ///
    /// # Arguments
    ///
    /// * `multiplier` - IQR multiplier for outlier bounds (typically 1.5)
    pub fn new(multiplier: f64) -> Result<Self> {
        if multiplier <= 0.0 {
            return Err(PipelineError::InvalidParameter {
                name: "multiplier".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self { multiplier })
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn squash(&self, data: &[f64]) -> Result<Vec<f64>> {
        let f = fences(data, self.multiplier)?;
        Ok(data
            .iter()
            .map(|&v| {
                if v < f.lower || v > f.upper {
                    f.median + f.spread * ((v - f.median) / f.spread).tanh()
                } else {
                    v
                }
            })
            .collect())
    }
}

impl Default for OutlierSquash {
    fn default() -> Self {
        Self { multiplier: 1.5 }
    }
}

impl Stage for OutlierSquash {
    fn name(&self) -> &str {
        "outlier_squash"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let values = payload.into_series()?;
        Ok(Payload::Series(self.squash(&values)?))
    }
}
