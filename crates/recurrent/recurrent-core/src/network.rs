//! Unrolled network with weight tying, BPTT and best-epoch selection

use crate::config::NetworkConfig;
use crate::unit::RecurrentUnit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recurrent_spi::{GateWeights, Optimizer, RecurrentError, Result, WeightSet};

/// Result of [`RecurrentNetwork::train`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    /// Parameters and states of the selected epoch
    pub weights: WeightSet,
    /// Signed final-step error of the selected epoch
    pub error: f64,
    /// Index of the selected epoch
    pub epoch: usize,
}

/// A chain of units sharing one set of tied weights.
///
/// Unit `t` is trained to predict the input of unit `t + 1`; only the last
/// unit is compared against the external target.
pub struct RecurrentNetwork<O: Optimizer> {
    config: NetworkConfig,
    units: Vec<RecurrentUnit>,
    weights: GateWeights,
    initial_y: f64,
    initial_c: f64,
    optimizer: O,
    rng: StdRng,
}

impl<O: Optimizer> RecurrentNetwork<O> {
    /// Build a network over `inputs` starting from `init`.
    ///
    /// `init` must match the configured variant and span exactly
    /// `inputs.len()` steps. Its step-0 weights become the tied weights and
    /// its step-0 states seed the first unit.
    pub fn new(
        config: NetworkConfig,
        inputs: &[f64],
        target: f64,
        init: &WeightSet,
        optimizer: O,
    ) -> Result<Self> {
        config.validate()?;
        if inputs.is_empty() {
            return Err(RecurrentError::EmptySequence);
        }
        init.validate()?;
        if init.variant() != config.variant {
            return Err(RecurrentError::VariantMismatch {
                expected: config.variant,
                actual: init.variant(),
            });
        }
        if init.window_size() != inputs.len() {
            return Err(RecurrentError::Shape {
                context: "window".to_string(),
                expected: init.window_size(),
                actual: inputs.len(),
            });
        }

        let units = inputs
            .iter()
            .enumerate()
            .map(|(t, &x)| {
                let next = inputs.get(t + 1).copied().unwrap_or(target);
                RecurrentUnit::new(config.variant, x, next)
            })
            .collect();
        let (initial_y, initial_c) = init.resume_state();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            units,
            weights: init.weights_at(0)?,
            initial_y,
            initial_c,
            optimizer,
            rng,
        })
    }

    /// Override the state fed to the first unit
    pub fn with_initial_state(mut self, y: f64, c: f64) -> Self {
        self.initial_y = y;
        self.initial_c = c;
        self
    }

    pub fn units(&self) -> &[RecurrentUnit] {
        &self.units
    }

    pub fn weights(&self) -> &GateWeights {
        &self.weights
    }

    pub fn outputs(&self) -> Vec<f64> {
        self.units.iter().map(RecurrentUnit::output).collect()
    }

    fn dropout_mask(&mut self, training: bool) -> f64 {
        let p = self.config.dropout;
        if !training || p == 0.0 {
            return 1.0;
        }
        if self.rng.gen::<f64>() < p {
            0.0
        } else {
            1.0 / (1.0 - p)
        }
    }

    /// Run every unit in time order and return the final-step error
    pub fn forward(&mut self, training: bool) -> f64 {
        let (mut y, mut c) = (self.initial_y, self.initial_c);
        for t in 0..self.units.len() {
            let mask = self.dropout_mask(training);
            let unit = &mut self.units[t];
            unit.forward(&self.weights, y, c, mask);
            y = unit.output();
            c = unit.cell_state();
        }
        self.units.last().map(RecurrentUnit::error).unwrap_or_default()
    }

    /// Backpropagate through time and return per-weight gradients averaged
    /// over the steps, without touching the weights
    pub fn gradients(&mut self) -> GateWeights {
        let mut grads = GateWeights::default();
        let mut carried = 0.0;
        for unit in self.units.iter_mut().rev() {
            unit.backward(carried);
            carried = unit.carried_gradient();
            unit.accumulate(&mut grads);
        }
        grads.scaled(1.0 / self.units.len() as f64)
    }

    /// Backpropagate and apply one optimizer step
    pub fn backward(&mut self) {
        let grads = self.gradients();
        self.optimizer
            .step(&mut self.weights, &grads, self.config.learning_rate);
    }

    /// Current weights with the states of the last forward pass
    pub fn snapshot(&self) -> WeightSet {
        WeightSet::from_tied(
            &self.weights,
            self.outputs(),
            self.units.iter().map(RecurrentUnit::cell_state).collect(),
            self.config.variant,
        )
    }

    /// Run `epochs` training passes and return the epoch whose final-step
    /// error has the smallest magnitude.
    ///
    /// Only the running best is kept. Each snapshot holds the weights that
    /// produced its error, taken before that epoch's update. With zero
    /// epochs a single inference pass is reported.
    pub fn train(&mut self, epochs: usize) -> TrainingOutcome {
        let error = self.forward(epochs > 0);
        let mut best = TrainingOutcome {
            weights: self.snapshot(),
            error,
            epoch: 0,
        };
        if epochs == 0 {
            return best;
        }
        self.backward();

        for epoch in 1..epochs {
            let error = self.forward(true);
            if error.abs() < best.error.abs() {
                best = TrainingOutcome {
                    weights: self.snapshot(),
                    error,
                    epoch,
                };
            }
            self.backward();
        }
        best
    }
}
