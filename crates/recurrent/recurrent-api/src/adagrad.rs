//! Adagrad optimizer

use recurrent_spi::{GateWeights, Optimizer, Parameter, RecurrentError, Result};
use serde::{Deserialize, Serialize};

/// Adagrad: each weight keeps a running sum `G` of its squared gradients and
/// steps by `lr / sqrt(G + eps) * g`.
///
/// @algorithm Adagrad
/// @complexity O(1) per parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adagrad {
    accumulators: [f64; 8],
    epsilon: f64,
}

impl Adagrad {
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    pub fn new() -> Self {
        Self {
            accumulators: [0.0; 8],
            epsilon: Self::DEFAULT_EPSILON,
        }
    }

    pub fn with_epsilon(epsilon: f64) -> Result<Self> {
        if !(epsilon > 0.0) {
            return Err(RecurrentError::InvalidParameter {
                name: "epsilon".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self {
            accumulators: [0.0; 8],
            epsilon,
        })
    }

    /// Sum of squared gradients seen so far for `parameter`
    pub fn accumulator(&self, parameter: Parameter) -> f64 {
        self.accumulators[parameter.index()]
    }
}

impl Default for Adagrad {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for Adagrad {
    fn step(&mut self, weights: &mut GateWeights, gradients: &GateWeights, learning_rate: f64) {
        for p in Parameter::ALL {
            let g = gradients.get(p);
            let acc = &mut self.accumulators[p.index()];
            *acc += g * g;
            *weights.get_mut(p) -= learning_rate / (*acc + self.epsilon).sqrt() * g;
        }
    }

    fn name(&self) -> &str {
        "adagrad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut opt = Adagrad::new();
        let mut w = GateWeights::splat(0.2);
        let mut g = GateWeights::default();
        g.wi = 0.5;
        opt.step(&mut w, &g, 0.01);
        // sqrt(0.25 + 1e-8) ~ 0.5, so the step is ~lr
        assert!((w.wi - 0.19).abs() < 1e-8);
        assert_eq!(w.wo, 0.2);
        assert_eq!(opt.accumulator(Parameter::Wi), 0.25);
    }

    #[test]
    fn test_steps_shrink_as_gradients_accumulate() {
        let mut opt = Adagrad::new();
        let mut w = GateWeights::default();
        let g = GateWeights::splat(1.0);
        opt.step(&mut w, &g, 0.1);
        let first = -w.wz;
        opt.step(&mut w, &g, 0.1);
        let second = -w.wz - first;
        assert!(second < first);
        assert!((second - 0.1 / 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_zero_gradient_leaves_weight() {
        let mut opt = Adagrad::new();
        let mut w = GateWeights::splat(1.0);
        opt.step(&mut w, &GateWeights::default(), 0.5);
        assert_eq!(w, GateWeights::splat(1.0));
    }

    #[test]
    fn test_invalid_epsilon() {
        assert!(Adagrad::with_epsilon(0.0).is_err());
    }
}
