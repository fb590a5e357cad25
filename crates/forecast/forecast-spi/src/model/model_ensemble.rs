//! Ordered weight sets, one per segment

use recurrent_spi::{GateVariant, WeightSet};
use serde::{Deserialize, Serialize};

/// One trained [`WeightSet`] per segment: per horizon offset for trend,
/// per time-of-day bucket for seasonality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelEnsemble {
    segments: Vec<WeightSet>,
}

impl ModelEnsemble {
    pub fn new(segments: Vec<WeightSet>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, segment: usize) -> Option<&WeightSet> {
        self.segments.get(segment)
    }

    pub fn segments(&self) -> &[WeightSet] {
        &self.segments
    }

    pub fn push(&mut self, weights: WeightSet) {
        self.segments.push(weights);
    }

    /// True when the ensemble has `segments` weight sets, each spanning
    /// `window_size` steps of the given variant
    pub fn fits(&self, segments: usize, window_size: usize, variant: GateVariant) -> bool {
        self.len() == segments
            && self
                .segments
                .iter()
                .all(|w| w.window_size() == window_size && w.variant() == variant)
    }
}

impl FromIterator<WeightSet> for ModelEnsemble {
    fn from_iter<I: IntoIterator<Item = WeightSet>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurrent_spi::GateWeights;

    fn ensemble(segments: usize, window: usize, variant: GateVariant) -> ModelEnsemble {
        (0..segments)
            .map(|_| WeightSet::initial(window, &GateWeights::splat(0.2), 0.2, 0.2, variant))
            .collect()
    }

    #[test]
    fn test_fits_shape() {
        let e = ensemble(7, 7, GateVariant::ForgetGated);
        assert!(e.fits(7, 7, GateVariant::ForgetGated));
        assert!(!e.fits(6, 7, GateVariant::ForgetGated));
        assert!(!e.fits(7, 14, GateVariant::ForgetGated));
        assert!(!e.fits(7, 7, GateVariant::Plain));
        assert!(!ModelEnsemble::default().fits(7, 7, GateVariant::Plain));
    }
}
