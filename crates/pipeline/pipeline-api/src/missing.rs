//! Missing-value and sign clean-up steps

use pipeline_spi::{Payload, Rank, Result, Stage};

/// Magnitude below which a reading counts as missing
pub const NEAR_ZERO: f64 = 1e-6;

/// Treat near-zero readings as missing data
#[derive(Debug, Clone, Copy)]
pub struct ZeroToMissing {
    threshold: f64,
}

impl ZeroToMissing {
    pub fn new() -> Self {
        Self {
            threshold: NEAR_ZERO,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ZeroToMissing {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ZeroToMissing {
    fn name(&self) -> &str {
        "zero_to_missing"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let threshold = self.threshold;
        Ok(payload.map_values(|v| if v.abs() < threshold { f64::NAN } else { v }))
    }
}

/// Clamp negative readings to zero, leaving missing values untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveNegatives;

impl RemoveNegatives {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for RemoveNegatives {
    fn name(&self) -> &str {
        "remove_negatives"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        Ok(payload.map_values(|v| if v < 0.0 { 0.0 } else { v }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_zero_becomes_missing() {
        let out = ZeroToMissing::new()
            .apply(Payload::Series(vec![0.0, 5e-7, -5e-7, 1e-6, 3.0]))
            .unwrap()
            .into_series()
            .unwrap();
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_eq!(out[3], 1e-6);
        assert_eq!(out[4], 3.0);
    }

    #[test]
    fn test_remove_negatives() {
        let out = RemoveNegatives::new()
            .apply(Payload::Series(vec![-2.0, 0.0, 4.0, f64::NAN]))
            .unwrap()
            .into_series()
            .unwrap();
        assert_eq!(&out[..3], &[0.0, 0.0, 4.0]);
        assert!(out[3].is_nan());
    }
}
