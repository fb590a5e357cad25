//! Moving average step

use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};
use serde::{Deserialize, Serialize};

/// Trailing-window moving average that keeps the series length.
///
/// The first `window - 1` points average over the shorter prefix available.
/// Missing values are skipped; a window with no present value stays missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverage {
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "window".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn smooth(&self, data: &[f64]) -> Vec<f64> {
        (0..data.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(self.window);
                let (sum, count) = data[start..=i]
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect()
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self { window: 3 }
    }
}

impl Stage for MovingAverage {
    fn name(&self) -> &str {
        "moving_average"
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
        Ok(Payload::Series(self.smooth(&values)))
    }
}
