//! Rounds, batches and the trend/seasonality join

use crate::config::TrainingConfig;
use crate::data::{prepare, PreparedData};
use chrono::Utc;
use forecast_core::{EarlyStopping, ModelTrainer, StoppingDecision, Validation, Validator};
use forecast_spi::{
    ForecastError, HyperParameters, ModelEnsemble, ModelState, Result, StateStore,
};
use pipeline_core::RegularSeries;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Summary of one `train` or `train_once` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Rounds completed by this call
    pub rounds: usize,
    /// Best trend RMS after the last selection
    pub trend_error: Option<f64>,
    /// Best seasonality RMS after the last selection
    pub seasonality_error: Option<f64>,
    /// Whether patience ran out before the round budget
    pub stopped_early: bool,
}

impl TrainingReport {
    fn observe(&mut self, state: &ModelState) {
        self.trend_error = state.trend.best_error();
        self.seasonality_error = state.seasonality.best_error();
    }
}

/// Error and per-segment errors of the single candidate a batch validates
fn first_score(validation: Validation) -> (f64, Vec<f64>) {
    let Validation {
        errors,
        segment_errors,
    } = validation;
    (
        errors.first().copied().unwrap_or(f64::NAN),
        segment_errors.into_iter().next().unwrap_or_default(),
    )
}

fn task_failed(task: &str, error: ForecastError) -> ForecastError {
    ForecastError::TaskFailed {
        task: task.to_string(),
        reason: error.to_string(),
    }
}

/// Owns the training loop and is the only writer of [`ModelState`]
/// counters and registries.
///
/// Every batch trains and validates the trend and seasonality ensembles
/// concurrently and saves the state once both have finished. A failure in
/// either task aborts the run before anything of that batch is recorded.
pub struct TrainingDriver<S: StateStore> {
    store: S,
    config: TrainingConfig,
}

impl<S: StateStore> TrainingDriver<S> {
    pub fn new(store: S, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// The stored state for the configured model, or a fresh one
    pub fn load_state(&self, hyper: HyperParameters) -> ModelState {
        self.store.load_or_default(&self.config.model_name, hyper)
    }

    /// Execute exactly one round on fresh observations
    pub fn train_once(
        &self,
        state: &mut ModelState,
        series: &[f64],
        timestamps: &[i64],
    ) -> Result<TrainingReport> {
        let data = self.prepare_run(state, series, timestamps)?;
        if state.progress.epoch_index >= state.hyper.epochs {
            state.progress.epoch_index = 0;
        }

        self.run_round(state, &data)?;
        let mut report = TrainingReport {
            rounds: 1,
            ..TrainingReport::default()
        };
        if state.progress.epoch_index >= state.hyper.epochs {
            state.progress.epoch_index = 0;
            self.store.save(state)?;
        }
        report.observe(state);
        Ok(report)
    }

    /// Execute the remaining rounds of the budget, stopping once the
    /// combined RMS has not improved for `patience` rounds
    pub fn train(
        &self,
        state: &mut ModelState,
        series: &[f64],
        timestamps: &[i64],
    ) -> Result<TrainingReport> {
        let data = self.prepare_run(state, series, timestamps)?;

        let mut stopper = EarlyStopping::new(state.hyper.patience, self.config.min_delta)
            .with_best(state.best_combined_error());
        let mut report = TrainingReport::default();
        while state.progress.epoch_index < state.hyper.epochs {
            let round = state.progress.epoch_index;
            let combined = self.run_round(state, &data)?;
            report.rounds += 1;
            match stopper.check(combined.unwrap_or(f64::NAN), round) {
                StoppingDecision::NewBest => info!(round, error = ?combined, "new best model"),
                StoppingDecision::NoImprovement { count, remaining } => {
                    info!(round, count, remaining, "no improvement")
                }
                StoppingDecision::Stop => {
                    info!(round, best_round = stopper.best_round(), "early stopping");
                    report.stopped_early = true;
                    break;
                }
            }
        }

        state.progress.epoch_index = 0;
        self.store.save(state)?;
        report.observe(state);
        Ok(report)
    }

    /// Validate the configuration, drop candidates the configuration no
    /// longer fits, prepare the data and re-score what is left
    fn prepare_run(
        &self,
        state: &mut ModelState,
        series: &[f64],
        timestamps: &[i64],
    ) -> Result<PreparedData> {
        state.hyper.validate()?;
        let data = prepare(series, timestamps, &state.hyper, &self.config)?;
        let removed = state.discard_incompatible();
        if removed > 0 {
            warn!(
                model = %state.name,
                removed,
                "discarded stored candidates that no longer fit the hyperparameters"
            );
        }
        self.revalidate(state, &data.held_out)?;
        Ok(data)
    }

    /// Run the remaining batches of the current round, then select the best
    /// candidates. Returns the best combined RMS.
    pub fn run_round(&self, state: &mut ModelState, data: &PreparedData) -> Result<Option<f64>> {
        let round = state.progress.epoch_index;
        let batches = data.training.batches(state.hyper.batch_size);
        let total = batches.len();
        for (index, batch) in batches.iter().enumerate().skip(state.progress.batch_index) {
            info!(round, batch = index, batches = total, "training batch");
            self.run_batch(state, batch, &data.held_out)?;
        }

        state.progress.batch_index = 0;
        state.progress.epoch_index += 1;
        state.update(Utc::now().timestamp());
        self.store.save(state)?;

        let combined = state.best_combined_error();
        info!(
            round,
            trend = ?state.trend.best_error(),
            seasonality = ?state.seasonality.best_error(),
            "round finished"
        );
        Ok(combined)
    }

    /// Train and validate both ensembles on one batch, append the
    /// candidates and save
    pub fn run_batch(
        &self,
        state: &mut ModelState,
        batch: &RegularSeries,
        held_out: &RegularSeries,
    ) -> Result<()> {
        let trainer = ModelTrainer::new(state.hyper.clone())?;
        let validator = Validator::new(state.hyper.clone())?;
        let progress = state.progress;
        let snapshot: &ModelState = state;

        let (trend, seasonality) = rayon::join(
            || -> Result<(ModelEnsemble, Validation)> {
                let ensemble = trainer.train_trend(batch, &progress, snapshot.trend.latest())?;
                let validation = validator.trend(held_out, std::slice::from_ref(&ensemble))?;
                Ok((ensemble, validation))
            },
            || -> Result<(ModelEnsemble, Validation)> {
                let ensemble = trainer.train_seasonality(
                    batch,
                    &progress,
                    snapshot.seasonality.latest(),
                    snapshot.seasonality.latest_segment_errors(),
                )?;
                let validation =
                    validator.seasonality(held_out, std::slice::from_ref(&ensemble))?;
                Ok((ensemble, validation))
            },
        );
        let (trend, seasonality) = match (trend, seasonality) {
            (Ok(trend), Ok(seasonality)) => (trend, seasonality),
            (Err(e), _) => return Err(task_failed("trend", e)),
            (_, Err(e)) => return Err(task_failed("seasonality", e)),
        };

        let (trend_ensemble, trend_validation) = trend;
        let (trend_error, trend_segments) = first_score(trend_validation);
        state.trend.push(trend_ensemble, trend_error, trend_segments);

        let (seasonality_ensemble, seasonality_validation) = seasonality;
        let (seasonality_error, seasonality_segments) = first_score(seasonality_validation);
        state
            .seasonality
            .push(seasonality_ensemble, seasonality_error, seasonality_segments);

        state.progress.batch_index += 1;
        state.progress.round_count += 1;
        self.store.save(state)
    }

    /// Score the stored candidates on new held-out data so they compete
    /// fairly with the ones trained next
    pub fn revalidate(&self, state: &mut ModelState, held_out: &RegularSeries) -> Result<()> {
        if !state.progress.is_warm() {
            return Ok(());
        }
        let validator = Validator::new(state.hyper.clone())?;
        let (trend, seasonality) = rayon::join(
            || validator.trend(held_out, state.trend.candidates()),
            || validator.seasonality(held_out, state.seasonality.candidates()),
        );

        match (trend, seasonality) {
            (Ok(trend), Ok(seasonality)) => {
                state.trend.replace_errors(trend.errors, trend.segment_errors)?;
                state
                    .seasonality
                    .replace_errors(seasonality.errors, seasonality.segment_errors)?;
                info!(
                    trend = ?state.trend.best_error(),
                    seasonality = ?state.seasonality.best_error(),
                    "stored candidates revalidated"
                );
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "revalidation failed, keeping recorded errors");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStateStore;
    use forecast_core::predict_seasonality;
    use forecast_spi::{GateVariant, WeightSet};

    const STEP: i64 = 6 * 3600;

    fn hyper() -> HyperParameters {
        HyperParameters {
            interval_minutes: 360,
            trend_points: 2,
            window_size_trend: 3,
            window_size_seasonality: 2,
            gd_iterations: 3,
            epochs: 3,
            dropout: 0.0,
            seed: Some(1),
            ..HyperParameters::default()
        }
    }

    /// Eight days, four samples a day
    fn observations() -> (Vec<f64>, Vec<i64>) {
        let timestamps: Vec<i64> = (0..32).map(|i| i * STEP).collect();
        let values = (0..32)
            .map(|i| 400.0 + 150.0 * ((i % 4) as f64 - 1.5).abs() + 2.0 * i as f64)
            .collect();
        (values, timestamps)
    }

    fn fresh_ensemble(hyper: &HyperParameters, segments: usize, window: usize) -> ModelEnsemble {
        (0..segments)
            .map(|_| {
                WeightSet::initial(
                    window,
                    &hyper.initial_weights,
                    hyper.initial_y,
                    hyper.initial_c,
                    hyper.gate,
                )
            })
            .collect()
    }

    fn driver() -> TrainingDriver<MemoryStateStore> {
        TrainingDriver::new(MemoryStateStore::new(), TrainingConfig::new("unit")).unwrap()
    }

    #[test]
    fn test_train_once_selects_one_candidate() {
        let driver = driver();
        let mut state = driver.load_state(hyper());
        let (values, timestamps) = observations();
        let report = driver.train_once(&mut state, &values, &timestamps).unwrap();

        assert_eq!(report.rounds, 1);
        assert_eq!(state.trend.len(), 1);
        assert_eq!(state.seasonality.len(), 1);
        assert_eq!(state.progress.round_count, 1);
        assert_eq!(state.progress.epoch_index, 1);
        assert_eq!(state.progress.batch_index, 0);
        assert!(state.last_trained.is_some());
        let saved = driver.store().load("unit").unwrap();
        assert_eq!(saved.progress, state.progress);
        assert_eq!(saved.trend.candidates(), state.trend.candidates());
    }

    #[test]
    fn test_batches_append_candidates() {
        let driver = driver();
        let mut state = ModelState::new(
            "unit",
            HyperParameters {
                batch_size: 2,
                ..hyper()
            },
        );
        let (values, timestamps) = observations();
        let data = prepare(&values, &timestamps, &state.hyper, driver.config()).unwrap();
        let batches = data.training.batches(2);

        driver.run_batch(&mut state, &batches[0], &data.held_out).unwrap();
        driver.run_batch(&mut state, &batches[1], &data.held_out).unwrap();
        assert_eq!(state.trend.len(), 2);
        assert_eq!(state.seasonality.len(), 2);
        assert_eq!(state.trend.errors().len(), 2);
        assert_eq!(state.progress.batch_index, 2);
        assert_eq!(state.progress.round_count, 2);
    }

    #[test]
    fn test_train_runs_budget_and_resets_epoch() {
        let driver = driver();
        let mut state = ModelState::new("unit", hyper());
        let (values, timestamps) = observations();
        let report = driver.train(&mut state, &values, &timestamps).unwrap();

        assert!(report.rounds >= 1 && report.rounds <= 3);
        assert_eq!(state.progress.epoch_index, 0);
        assert_eq!(state.trend.len(), 1);
        assert!(report.trend_error.is_some());
    }

    #[test]
    fn test_patience_stops_early() {
        let driver = driver();
        let mut state = ModelState::new(
            "unit",
            HyperParameters {
                epochs: 10,
                patience: 0,
                ..hyper()
            },
        );
        let (values, timestamps) = observations();
        // a perfect recorded error can never be beaten
        state.trend.push(fresh_ensemble(&state.hyper, 2, 3), 0.0, vec![]);
        state
            .seasonality
            .push(fresh_ensemble(&state.hyper, 4, 2), 0.0, vec![]);
        let report = driver.train(&mut state, &values, &timestamps).unwrap();
        assert_eq!(report.rounds, 1);
        assert!(report.stopped_early);
    }

    #[test]
    fn test_too_many_missing_is_refused_before_training() {
        let driver = driver();
        let mut state = ModelState::new("unit", hyper());
        let timestamps: Vec<i64> = (0..20).map(|i| i * 4 * STEP).collect();
        let values = vec![100.0; 20];
        let result = driver.train_once(&mut state, &values, &timestamps);
        assert!(matches!(result, Err(ForecastError::TooManyMissing { .. })));
        assert!(driver.store().is_empty());
        assert!(state.trend.is_empty());
    }

    #[test]
    fn test_warm_round_revalidates_and_keeps_one() {
        let driver = driver();
        let mut state = ModelState::new("unit", hyper());
        let (values, timestamps) = observations();
        driver.train_once(&mut state, &values, &timestamps).unwrap();
        driver.train_once(&mut state, &values, &timestamps).unwrap();
        assert_eq!(state.trend.len(), 1);
        assert_eq!(state.progress.epoch_index, 2);
        assert_eq!(state.progress.round_count, 1);
    }

    #[test]
    fn test_changed_shape_discards_stored_candidates() {
        let driver = driver();
        let mut state = ModelState::new("unit", hyper());
        let (values, timestamps) = observations();
        driver.train_once(&mut state, &values, &timestamps).unwrap();

        // switch to a 12-hour grid and the plain unit on a warm state
        state.hyper.interval_minutes = 720;
        state.hyper.gate = GateVariant::Plain;
        let timestamps: Vec<i64> = (0..16).map(|i| i * 2 * STEP).collect();
        let values: Vec<f64> = (0..16).map(|i| 300.0 + 40.0 * (i % 2) as f64).collect();
        driver.train_once(&mut state, &values, &timestamps).unwrap();

        let best = state.best_seasonality().unwrap();
        assert!(best.fits(2, 2, GateVariant::Plain));
        assert!(state.best_trend().unwrap().fits(2, 3, GateVariant::Plain));
        assert!(predict_seasonality(&values, &timestamps, &state).is_ok());
    }
}
