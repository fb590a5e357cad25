//! Cosine-annealed learning rate

use recurrent_spi::{LearningRateSchedule, RecurrentError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// `lr = min + 0.5 * (max - min) * (1 + cos(pi * round / budget))`
///
/// `round` is the outer training round, shared by every segment trained in
/// that round. Rounds past the budget stay at `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CosineAnnealing {
    max: f64,
    min: f64,
    budget: usize,
}

impl CosineAnnealing {
    pub fn new(max: f64, min: f64, budget: usize) -> Result<Self> {
        if !(min >= 0.0 && max >= min) {
            return Err(RecurrentError::InvalidParameter {
                name: "learning_rate".to_string(),
                reason: format!("need 0 <= min <= max, got min={} max={}", min, max),
            });
        }
        Ok(Self { max, min, budget })
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn budget(&self) -> usize {
        self.budget
    }
}

impl LearningRateSchedule for CosineAnnealing {
    fn rate(&self, round: usize) -> f64 {
        if self.budget == 0 {
            return self.max;
        }
        let progress = round.min(self.budget) as f64 / self.budget as f64;
        self.min + 0.5 * (self.max - self.min) * (1.0 + (PI * progress).cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_and_midpoint() {
        let schedule = CosineAnnealing::new(0.02, 0.00005, 50).unwrap();
        assert!((schedule.rate(0) - 0.02).abs() < 1e-15);
        assert!((schedule.rate(25) - (0.00005 + 0.5 * (0.02 - 0.00005))).abs() < 1e-12);
        assert!((schedule.rate(50) - 0.00005).abs() < 1e-15);
    }

    #[test]
    fn test_monotone_decreasing() {
        let schedule = CosineAnnealing::new(0.02, 0.00005, 50).unwrap();
        let rates: Vec<f64> = (0..=50).map(|r| schedule.rate(r)).collect();
        assert!(rates.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_past_budget_stays_at_min() {
        let schedule = CosineAnnealing::new(0.1, 0.01, 10).unwrap();
        assert_eq!(schedule.rate(11), schedule.rate(10));
    }

    #[test]
    fn test_zero_budget() {
        let schedule = CosineAnnealing::new(0.1, 0.01, 0).unwrap();
        assert_eq!(schedule.rate(3), 0.1);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(CosineAnnealing::new(0.01, 0.1, 10).is_err());
    }
}
