//! Windowed training examples

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// History windows paired with the value each window should predict
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSet {
    inputs: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl WindowSet {
    /// Build a window set, checking that every window has a target and
    /// that all windows share one length.
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(PipelineError::LengthMismatch {
                expected: inputs.len(),
                actual: targets.len(),
            });
        }
        if let Some(first) = inputs.first() {
            let width = first.len();
            if let Some(bad) = inputs.iter().find(|w| w.len() != width) {
                return Err(PipelineError::LengthMismatch {
                    expected: width,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { inputs, targets })
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Number of (window, target) pairs
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Length of each window, if any window exists
    pub fn window_size(&self) -> Option<usize> {
        self.inputs.first().map(Vec::len)
    }

    /// Iterate over (window, target) pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&[f64], f64)> {
        self.inputs
            .iter()
            .map(Vec::as_slice)
            .zip(self.targets.iter().copied())
    }

    /// Every number held, windows first then targets
    pub fn values(&self) -> Vec<f64> {
        self.inputs
            .iter()
            .flatten()
            .chain(self.targets.iter())
            .copied()
            .collect()
    }

    /// Apply `f` to every number, keeping the shape
    pub fn map_values<F: Fn(f64) -> f64>(self, f: F) -> Self {
        Self {
            inputs: self
                .inputs
                .into_iter()
                .map(|w| w.into_iter().map(&f).collect())
                .collect(),
            targets: self.targets.into_iter().map(&f).collect(),
        }
    }

    /// Reorder pairs by `order`, a permutation of `0..len()`
    pub fn reorder(self, order: &[usize]) -> Result<Self> {
        if order.len() != self.len() {
            return Err(PipelineError::LengthMismatch {
                expected: self.len(),
                actual: order.len(),
            });
        }
        let mut inputs = Vec::with_capacity(order.len());
        let mut targets = Vec::with_capacity(order.len());
        for &i in order {
            let window = self.inputs.get(i).ok_or(PipelineError::LengthMismatch {
                expected: self.len(),
                actual: i + 1,
            })?;
            inputs.push(window.clone());
            targets.push(self.targets[i]);
        }
        Ok(Self { inputs, targets })
    }
}
