//! Persistent model state

use super::{HyperParameters, ModelEnsemble, ModelRegistry, TrainingProgress};
use serde::{Deserialize, Serialize};

/// Everything needed to resume training or serve predictions for one model.
///
/// The outer training driver owns the state and is the only place that
/// advances its counters or appends candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub name: String,
    #[serde(default)]
    pub hyper: HyperParameters,
    #[serde(default)]
    pub trend: ModelRegistry,
    #[serde(default)]
    pub seasonality: ModelRegistry,
    #[serde(default)]
    pub progress: TrainingProgress,
    /// Epoch seconds of the last selection
    #[serde(default)]
    pub last_trained: Option<i64>,
}

impl ModelState {
    pub fn new(name: impl Into<String>, hyper: HyperParameters) -> Self {
        Self {
            name: name.into(),
            hyper,
            trend: ModelRegistry::new(),
            seasonality: ModelRegistry::new(),
            progress: TrainingProgress::default(),
            last_trained: None,
        }
    }

    /// Keep the best candidate of each registry, reset the round counter to
    /// 1 and stamp the selection time
    pub fn update(&mut self, now: i64) {
        self.trend.retain_best();
        self.seasonality.retain_best();
        self.progress.round_count = 1;
        self.last_trained = Some(now);
    }

    /// Drop stored candidates whose shape no longer matches `hyper`, such as
    /// after a change of interval, window size or gate variant. A state left
    /// without any candidate trains cold again. Returns the number removed.
    pub fn discard_incompatible(&mut self) -> usize {
        let hyper = &self.hyper;
        let removed = self.trend.retain_candidates(|c| {
            c.fits(hyper.trend_points, hyper.window_size_trend, hyper.gate)
        }) + self.seasonality.retain_candidates(|c| {
            c.fits(
                hyper.buckets_per_day(),
                hyper.window_size_seasonality,
                hyper.gate,
            )
        });
        if removed > 0 && self.trend.is_empty() && self.seasonality.is_empty() {
            self.progress.round_count = 0;
        }
        removed
    }

    pub fn best_trend(&self) -> Option<&ModelEnsemble> {
        self.trend.best()
    }

    pub fn best_seasonality(&self) -> Option<&ModelEnsemble> {
        self.seasonality.best()
    }

    /// Sum of the best trend and seasonality errors, if both exist
    pub fn best_combined_error(&self) -> Option<f64> {
        Some(self.trend.best_error()? + self.seasonality.best_error()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurrent_spi::{GateVariant, GateWeights, WeightSet};

    fn ensemble(segments: usize, marker: f64) -> ModelEnsemble {
        (0..segments)
            .map(|_| {
                WeightSet::initial(3, &GateWeights::splat(marker), 0.2, 0.2, GateVariant::ForgetGated)
            })
            .collect()
    }

    fn trained_state() -> ModelState {
        let mut state = ModelState::new("site-a", HyperParameters::default());
        state.trend.push(ensemble(7, 0.1), 0.5, vec![]);
        state.trend.push(ensemble(7, 0.2), 0.3, vec![]);
        state.seasonality.push(ensemble(48, 0.3), 0.2, vec![0.2; 48]);
        state.seasonality.push(ensemble(48, 0.4), 0.7, vec![0.7; 48]);
        state.progress.round_count = 4;
        state
    }

    #[test]
    fn test_new_state_is_cold() {
        let state = ModelState::new("x", HyperParameters::default());
        assert!(!state.progress.is_warm());
        assert!(state.best_trend().is_none());
        assert_eq!(state.best_combined_error(), None);
    }

    #[test]
    fn test_update_keeps_one_candidate_each() {
        let mut state = trained_state();
        state.update(1_700_000_000);

        assert_eq!(state.trend.len(), 1);
        assert_eq!(state.seasonality.len(), 1);
        assert_eq!(state.trend.errors(), &[0.3]);
        assert_eq!(state.seasonality.errors(), &[0.2]);
        assert_eq!(state.best_trend().map(ModelEnsemble::len), Some(7));
        assert_eq!(state.best_seasonality().map(ModelEnsemble::len), Some(48));
        assert_eq!(state.progress.round_count, 1);
        assert_eq!(state.last_trained, Some(1_700_000_000));
    }

    #[test]
    fn test_discard_incompatible() {
        let hyper = HyperParameters {
            window_size_trend: 3,
            window_size_seasonality: 3,
            ..HyperParameters::default()
        };
        let mut state = trained_state();
        state.hyper = hyper.clone();
        assert_eq!(state.discard_incompatible(), 0);
        assert_eq!(state.trend.len(), 2);

        // 60-minute grid: 24 buckets, the stored 48-bucket candidates go
        state.hyper.interval_minutes = 60;
        assert_eq!(state.discard_incompatible(), 2);
        assert!(state.seasonality.is_empty());
        assert_eq!(state.trend.len(), 2);
        assert!(state.progress.is_warm());

        state.hyper.gate = GateVariant::Plain;
        assert_eq!(state.discard_incompatible(), 2);
        assert!(state.best_trend().is_none());
        assert!(!state.progress.is_warm());
    }

    #[test]
    fn test_best_combined_error() {
        let state = trained_state();
        assert!((state.best_combined_error().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_json_round_trip() {
        let state = trained_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: ModelState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_minimal_json_takes_defaults() {
        let state: ModelState = serde_json::from_str(r#"{"name": "bare"}"#).unwrap();
        assert_eq!(state.name, "bare");
        assert_eq!(state.hyper, HyperParameters::default());
        assert!(state.trend.is_empty());
    }
}
