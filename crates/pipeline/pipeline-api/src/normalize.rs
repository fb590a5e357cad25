//! Z-score normalize step

use pipeline_core::ZStats;
use pipeline_spi::{Payload, Rank, Result, Stage};
use tracing::debug;

/// Standardize every value of a payload.
///
/// With supplied statistics the same (mean, stddev) is applied; otherwise
/// they are computed from the flattened payload. An empty payload passes
/// through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalize {
    stats: Option<ZStats>,
}

impl Normalize {
    /// Compute statistics from each payload
    pub fn new() -> Self {
        Self { stats: None }
    }

    /// Apply fixed statistics
    pub fn with_stats(stats: ZStats) -> Self {
        Self { stats: Some(stats) }
    }

    /// Statistics this step would apply to `payload`
    pub fn stats_for(&self, payload: &Payload) -> Result<ZStats> {
        match self.stats {
            Some(stats) => Ok(stats),
            None => ZStats::from_values(&payload.flatten()),
        }
    }
}

impl Stage for Normalize {
    fn name(&self) -> &str {
        "normalize"
    }

    fn accepts(&self, _rank: Rank) -> bool {
        true
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        if self.stats.is_none() && payload.flatten().iter().all(|v| !v.is_finite()) {
            return Ok(payload);
        }
        let stats = self.stats_for(&payload)?;
        if stats.is_degenerate() {
            debug!(mean = stats.mean(), "zero variance, substituting epsilon std dev");
        }
        Ok(payload.map_values(|v| stats.normalize(v)))
    }
}

/// Exact inverse of [`Normalize`] for identical statistics
#[derive(Debug, Clone, Copy)]
pub struct ReverseNormalize {
    stats: ZStats,
}

impl ReverseNormalize {
    pub fn new(stats: ZStats) -> Self {
        Self { stats }
    }
}

impl Stage for ReverseNormalize {
    fn name(&self) -> &str {
        "reverse_normalize"
    }

    fn accepts(&self, _rank: Rank) -> bool {
        true
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        let stats = self.stats;
        Ok(payload.map_values(|v| stats.denormalize(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_spi::WindowSet;

    #[test]
    fn test_computed_stats() {
        let out = Normalize::new()
            .apply(Payload::Series(vec![1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap()
            .into_series()
            .unwrap();
        assert!((out[2]).abs() < 1e-12);
        assert!((out[4] - 2.0 / 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_supplied_stats_round_trip() {
        let stats = ZStats::new(3.0, 2.0);
        let payload = Payload::Grouped(vec![vec![1.0, 7.0], vec![-3.0]]);
        let normalized = Normalize::with_stats(stats).apply(payload.clone()).unwrap();
        assert_eq!(normalized.flatten(), vec![-1.0, 2.0, -3.0]);
        let back = ReverseNormalize::new(stats).apply(normalized).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_windowed_uses_inputs_and_targets() {
        let windows = WindowSet::new(vec![vec![1.0, 3.0]], vec![5.0]).unwrap();
        let payload = Payload::Windowed(windows);
        let stats = Normalize::new().stats_for(&payload).unwrap();
        assert_eq!(stats.mean(), 3.0);
    }

    #[test]
    fn test_constant_series_is_finite() {
        let out = Normalize::new()
            .apply(Payload::Series(vec![2.0, 2.0]))
            .unwrap()
            .flatten();
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_windows_pass_through() {
        let payload = Payload::Windowed(WindowSet::default());
        assert_eq!(Normalize::new().apply(payload.clone()).unwrap(), payload);
    }
}
