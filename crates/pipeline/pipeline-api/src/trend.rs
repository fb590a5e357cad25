//! Trend reshape step

use pipeline_core::TimeOfDay;
use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};

/// Reorganize a corrected series into one row per trend horizon offset.
///
/// Row `k` is the contiguous suffix of the series starting at the first
/// index `s` whose window target `s + window_size` has horizon offset `k`.
/// Rows with no such start are empty. [`TrendReshape::row_offsets`] gives the
/// horizon offset of every value in each row; feeding them to
/// [`crate::StiffenedWindow::aligned`] keeps every training target of row `k`
/// on offset `k`, including across midnight when the day length is not a
/// multiple of `trend_points`.
#[derive(Debug, Clone)]
pub struct TrendReshape {
    timestamps: Vec<i64>,
    calendar: TimeOfDay,
    trend_points: usize,
    window_size: usize,
}

impl TrendReshape {
    pub fn new(
        timestamps: Vec<i64>,
        calendar: TimeOfDay,
        trend_points: usize,
        window_size: usize,
    ) -> Result<Self> {
        if trend_points == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "trend_points".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            timestamps,
            calendar,
            trend_points,
            window_size,
        })
    }

    fn offsets(&self) -> Vec<usize> {
        self.timestamps
            .iter()
            .map(|&ts| self.calendar.horizon_offset(ts, self.trend_points))
            .collect()
    }

    /// Start index of row `k` within the series
    fn row_start(&self, offsets: &[usize], k: usize) -> Option<usize> {
        offsets.iter().skip(self.window_size).position(|&o| o == k)
    }

    pub fn reshape(&self, values: &[f64]) -> Result<Vec<Vec<f64>>> {
        if values.len() != self.timestamps.len() {
            return Err(PipelineError::LengthMismatch {
                expected: self.timestamps.len(),
                actual: values.len(),
            });
        }
        let offsets = self.offsets();
        let rows = (0..self.trend_points)
            .map(|k| {
                self.row_start(&offsets, k)
                    .map(|start| values[start..].to_vec())
                    .unwrap_or_default()
            })
            .collect();
        Ok(rows)
    }

    /// Horizon offset of every value of every row, aligned with
    /// [`TrendReshape::reshape`]
    pub fn row_offsets(&self) -> Vec<Vec<usize>> {
        let offsets = self.offsets();
        (0..self.trend_points)
            .map(|k| {
                self.row_start(&offsets, k)
                    .map(|start| offsets[start..].to_vec())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl Stage for TrendReshape {
    fn name(&self) -> &str {
        "trend_reshape"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, _input: Rank) -> Rank {
        Rank::Grouped
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let values = payload.into_series()?;
        Ok(Payload::Grouped(self.reshape(&values)?))
    }
}
