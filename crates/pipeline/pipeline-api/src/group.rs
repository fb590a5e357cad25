//! Group-by-hour-and-minute step

use pipeline_core::TimeOfDay;
use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};

/// Reshape a flat series into one row per time-of-day bucket.
///
/// Row `b` holds, in chronological order, every value whose aligned
/// timestamp falls in bucket `b`. All `buckets_per_day` rows are emitted,
/// empty ones included, so row index always equals bucket index.
#[derive(Debug, Clone)]
pub struct GroupByTimeOfDay {
    timestamps: Vec<i64>,
    calendar: TimeOfDay,
}

impl GroupByTimeOfDay {
    pub fn new(timestamps: Vec<i64>, calendar: TimeOfDay) -> Self {
        Self {
            timestamps,
            calendar,
        }
    }

    pub fn group(&self, values: &[f64]) -> Result<Vec<Vec<f64>>> {
        if values.len() != self.timestamps.len() {
            return Err(PipelineError::LengthMismatch {
                expected: self.timestamps.len(),
                actual: values.len(),
            });
        }
        let mut rows = vec![Vec::new(); self.calendar.buckets_per_day()];
        for (&ts, &v) in self.timestamps.iter().zip(values) {
            rows[self.calendar.bucket(ts)].push(v);
        }
        Ok(rows)
    }
}

impl Stage for GroupByTimeOfDay {
    fn name(&self) -> &str {
        "group_by_time_of_day"
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
        Ok(Payload::Grouped(self.group(&values)?))
    }
}
