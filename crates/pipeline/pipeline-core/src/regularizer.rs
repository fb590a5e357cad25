//! Mapping irregular observations onto a fixed-interval grid

use crate::batch::batch_sizes;
use pipeline_spi::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// A series sampled on a regular grid; absent points are NaN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegularSeries {
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

impl RegularSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of present (non-NaN) values
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Share of missing values; 1.0 for an empty series
    pub fn missing_ratio(&self) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        1.0 - self.valid_count() as f64 / self.len() as f64
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }

    /// Split into `[0, index)` and `[index, len)`
    pub fn split_at(&self, index: usize) -> (RegularSeries, RegularSeries) {
        let index = index.min(self.len());
        (
            RegularSeries {
                timestamps: self.timestamps[..index].to_vec(),
                values: self.values[..index].to_vec(),
            },
            RegularSeries {
                timestamps: self.timestamps[index..].to_vec(),
                values: self.values[index..].to_vec(),
            },
        )
    }

    /// The trailing `n` points
    pub fn tail(&self, n: usize) -> RegularSeries {
        let start = self.len().saturating_sub(n);
        self.split_at(start).1
    }

    /// Contiguous batches, the first ones taking the remainder
    pub fn batches(&self, count: usize) -> Vec<RegularSeries> {
        let mut start = 0;
        batch_sizes(self.len(), count)
            .into_iter()
            .map(|size| {
                let batch = RegularSeries {
                    timestamps: self.timestamps[start..start + size].to_vec(),
                    values: self.values[start..start + size].to_vec(),
                };
                start += size;
                batch
            })
            .collect()
    }

    /// Apply `f` to every value
    pub fn map_values<F: Fn(f64) -> f64>(mut self, f: F) -> Self {
        self.values.iter_mut().for_each(|v| *v = f(*v));
        self
    }
}

/// Places (timestamp, value) observations onto a grid starting at the
/// earliest timestamp and stepping by a fixed interval.
///
/// Each observation lands in the nearest slot; when two land in the same
/// slot the later one wins. The grid spans
/// `ceil((last - first) / interval) + 1` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeIndexRegularizer {
    interval_seconds: i64,
}

impl TimeIndexRegularizer {
    pub fn new(interval_minutes: u32) -> Result<Self> {
        if interval_minutes == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "interval_minutes".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self {
            interval_seconds: i64::from(interval_minutes) * 60,
        })
    }

    pub fn interval_seconds(&self) -> i64 {
        self.interval_seconds
    }

    pub fn regularize(&self, timestamps: &[i64], values: &[f64]) -> Result<RegularSeries> {
        if timestamps.len() != values.len() {
            return Err(PipelineError::LengthMismatch {
                expected: timestamps.len(),
                actual: values.len(),
            });
        }
        if timestamps.is_empty() {
            return Ok(RegularSeries::default());
        }

        let mut observations: Vec<(i64, f64)> =
            timestamps.iter().copied().zip(values.iter().copied()).collect();
        observations.sort_by_key(|(t, _)| *t);

        let first = observations[0].0;
        let last = observations[observations.len() - 1].0;
        let step = self.interval_seconds;
        let span = last - first;
        let slots = ((span + step - 1) / step) as usize + 1;

        let grid: Vec<i64> = (0..slots as i64).map(|k| first + k * step).collect();
        let mut filled = vec![f64::NAN; slots];
        for (t, v) in observations {
            let slot = (((t - first) + step / 2) / step) as usize;
            filled[slot.min(slots - 1)] = v;
        }

        Ok(RegularSeries {
            timestamps: grid,
            values: filled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regularizer() -> TimeIndexRegularizer {
        TimeIndexRegularizer::new(30).unwrap()
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert!(TimeIndexRegularizer::new(0).is_err());
    }

    #[test]
    fn test_gaps_become_missing() {
        let series = regularizer()
            .regularize(&[0, 1800, 5400], &[1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(series.timestamps, vec![0, 1800, 3600, 5400]);
        assert_eq!(series.values[0], 1.0);
        assert_eq!(series.values[1], 2.0);
        assert!(series.values[2].is_nan());
        assert_eq!(series.values[3], 3.0);
    }

    #[test]
    fn test_length_uses_ceiling() {
        let series = regularizer()
            .regularize(&[0, 1000, 4000], &[1.0, 2.0, 3.0])
            .unwrap();
        // ceil(4000 / 1800) + 1
        assert_eq!(series.len(), 4);
        assert_eq!(series.valid_count(), 3);
        assert_eq!(series.values[1], 2.0);
        assert_eq!(series.values[2], 3.0);
        assert!(series.values[3].is_nan());
    }

    #[test]
    fn test_unsorted_input() {
        let series = regularizer()
            .regularize(&[3600, 0, 1800], &[3.0, 1.0, 2.0])
            .unwrap();
        assert_eq!(series.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_duplicate_slot_keeps_later_observation() {
        let series = regularizer()
            .regularize(&[0, 60, 1800], &[1.0, 5.0, 2.0])
            .unwrap();
        assert_eq!(series.values, vec![5.0, 2.0]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(regularizer().regularize(&[0, 1800], &[1.0]).is_err());
    }

    #[test]
    fn test_empty_input() {
        let series = regularizer().regularize(&[], &[]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.missing_ratio(), 1.0);
    }

    #[test]
    fn test_split_and_tail() {
        let series = regularizer()
            .regularize(&[0, 1800, 3600, 5400], &[1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let (head, rest) = series.split_at(3);
        assert_eq!(head.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(rest.timestamps, vec![5400]);
        assert_eq!(series.tail(2).values, vec![3.0, 4.0]);
        assert_eq!(series.tail(10).len(), 4);
    }

    #[test]
    fn test_batches() {
        let series = RegularSeries {
            timestamps: (0..5).collect(),
            values: vec![1.0; 5],
        };
        let batches = series.batches(2);
        assert_eq!(batches[0].timestamps, vec![0, 1, 2]);
        assert_eq!(batches[1].timestamps, vec![3, 4]);
    }
}
