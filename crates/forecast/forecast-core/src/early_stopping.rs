//! Early stopping across training rounds.
//!
//! Tracks the best combined validation RMS and signals when it has not
//! improved for `patience` consecutive rounds.

/// Outcome of recording one round's validation error
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoppingDecision {
    /// The error improved on the best so far
    NewBest,
    /// No improvement yet, patience not exhausted
    NoImprovement {
        /// Consecutive rounds without improvement
        count: usize,
        /// Rounds left before stopping
        remaining: usize,
    },
    /// Patience exhausted
    Stop,
}

/// Patience tracker over a minimized metric
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f64,
    best_value: f64,
    best_round: usize,
    counter: usize,
    stopped: bool,
}

impl EarlyStopping {
    /// Stop after `patience` rounds whose error is not at least `min_delta`
    /// below the best one
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta,
            best_value: f64::INFINITY,
            best_round: 0,
            counter: 0,
            stopped: false,
        }
    }

    /// Start from a previously recorded best error
    pub fn with_best(mut self, best: Option<f64>) -> Self {
        if let Some(value) = best.filter(|v| v.is_finite()) {
            self.best_value = value;
        }
        self
    }

    /// Record the error of `round`. NaN never counts as an improvement.
    pub fn check(&mut self, value: f64, round: usize) -> StoppingDecision {
        if self.stopped {
            return StoppingDecision::Stop;
        }

        if self.best_value - value > self.min_delta {
            self.best_value = value;
            self.best_round = round;
            self.counter = 0;
            return StoppingDecision::NewBest;
        }

        self.counter += 1;
        if self.counter >= self.patience {
            self.stopped = true;
            StoppingDecision::Stop
        } else {
            StoppingDecision::NoImprovement {
                count: self.counter,
                remaining: self.patience - self.counter,
            }
        }
    }

    pub fn should_stop(&self) -> bool {
        self.stopped
    }

    /// Best error seen, if any round improved on the start value
    pub fn best_value(&self) -> Option<f64> {
        self.best_value.is_finite().then_some(self.best_value)
    }

    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn reset(&mut self) {
        self.best_value = f64::INFINITY;
        self.best_round = 0;
        self.counter = 0;
        self.stopped = false;
    }
}
