//! Forward-only pass used for prediction

use crate::unit::RecurrentUnit;
use recurrent_spi::{RecurrentError, Result, WeightSet};

/// Outputs of every step when `window` is run through `weights` with
/// dropout disabled.
///
/// Only the trailing `weights.window_size()` values are used; a shorter
/// window runs over the steps it covers.
pub fn forward_trace(
    weights: &WeightSet,
    window: &[f64],
    initial_y: f64,
    initial_c: f64,
) -> Result<Vec<f64>> {
    if window.is_empty() {
        return Err(RecurrentError::EmptySequence);
    }
    weights.validate()?;
    let recent = &window[window.len().saturating_sub(weights.window_size())..];
    let variant = weights.variant();

    let (mut y, mut c) = (initial_y, initial_c);
    let mut outputs = Vec::with_capacity(recent.len());
    for (t, &x) in recent.iter().enumerate() {
        let w = weights.weights_at(t)?;
        let mut unit = RecurrentUnit::new(variant, x, 0.0);
        unit.forward(&w, y, c, 1.0);
        y = unit.output();
        c = unit.cell_state();
        outputs.push(y);
    }
    Ok(outputs)
}

/// Final output of [`forward_trace`]
pub fn forward_only(
    weights: &WeightSet,
    window: &[f64],
    initial_y: f64,
    initial_c: f64,
) -> Result<f64> {
    let outputs = forward_trace(weights, window, initial_y, initial_c)?;
    outputs.last().copied().ok_or(RecurrentError::EmptySequence)
}
