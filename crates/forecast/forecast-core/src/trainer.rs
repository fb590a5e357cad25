//! Trend and seasonality ensemble training

use crate::iterations::dynamic_iterations;
use crate::preprocess::{calendar, correction_pipeline};
use forecast_spi::{HyperParameters, ModelEnsemble, Result, TrainingProgress};
use pipeline_api::{GroupByTimeOfDay, Normalize, Shuffle, StiffenedWindow, TrendReshape, Window};
use pipeline_core::{Pipeline, RegularSeries, TimeOfDay};
use pipeline_spi::{Payload, Rank, Stage};
use rayon::prelude::*;
use recurrent_api::{CosineAnnealing, SegmentTrainer};
use recurrent_core::NetworkConfig;
use recurrent_spi::{LearningRateSchedule, WeightSet};
use tracing::{debug, info};

/// Seed for one segment derived from the run seed and the position of the
/// batch in the run, so rounds and batches draw fresh shuffles and masks
fn segment_seed(seed: u64, progress: &TrainingProgress, segment: usize) -> u64 {
    [progress.epoch_index, progress.batch_index, segment]
        .iter()
        .fold(seed, |acc, &v| {
            acc.wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(v as u64)
        })
}

/// Trains one ensemble per call: a `WeightSet` per trend horizon offset or
/// per time-of-day bucket.
///
/// Training never touches a [`forecast_spi::ModelState`]. The caller hands in
/// the progress counters and the previous generation, and appends the
/// returned ensemble itself. Segments are independent and train in
/// parallel.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    hyper: HyperParameters,
    calendar: TimeOfDay,
}

impl ModelTrainer {
    pub fn new(hyper: HyperParameters) -> Result<Self> {
        hyper.validate()?;
        let calendar = calendar(&hyper)?;
        Ok(Self { hyper, calendar })
    }

    pub fn hyper(&self) -> &HyperParameters {
        &self.hyper
    }

    /// Cosine-annealed rate for the current outer round
    pub fn learning_rate(&self, progress: &TrainingProgress) -> Result<f64> {
        let schedule = CosineAnnealing::new(
            self.hyper.learning_rate_max,
            self.hyper.learning_rate_min,
            self.hyper.epochs,
        )?;
        Ok(schedule.rate(progress.epoch_index))
    }

    fn trend_reshape(&self, series: &RegularSeries) -> Result<TrendReshape> {
        Ok(TrendReshape::new(
            series.timestamps.clone(),
            self.calendar,
            self.hyper.trend_points,
            self.hyper.window_size_trend,
        )?)
    }

    /// Corrected series reshaped to one row per horizon offset
    pub fn trend_rows(&self, series: &RegularSeries) -> Result<Vec<Vec<f64>>> {
        let payload = correction_pipeline(&self.hyper)?
            .then(self.trend_reshape(series)?)?
            .run(Payload::Series(series.values.clone()))?;
        Ok(payload.into_grouped()?)
    }

    /// Training windows of every trend row; row `k` only keeps targets on
    /// horizon offset `k`
    pub fn trend_windowing(&self, series: &RegularSeries) -> Result<Vec<StiffenedWindow>> {
        self.trend_reshape(series)?
            .row_offsets()
            .into_iter()
            .enumerate()
            .map(|(k, offsets)| -> Result<StiffenedWindow> {
                Ok(StiffenedWindow::aligned(
                    self.hyper.window_size_trend,
                    self.hyper.trend_points,
                    offsets,
                    k,
                )?)
            })
            .collect()
    }

    /// Corrected series grouped into one row per time-of-day bucket
    pub fn seasonality_rows(&self, series: &RegularSeries) -> Result<Vec<Vec<f64>>> {
        let group = GroupByTimeOfDay::new(series.timestamps.clone(), self.calendar);
        let payload = correction_pipeline(&self.hyper)?
            .then(group)?
            .run(Payload::Series(series.values.clone()))?;
        Ok(payload.into_grouped()?)
    }

    /// Train one `WeightSet` per trend horizon offset.
    ///
    /// When `progress` is warm, segment `k` starts from `previous[k]`.
    pub fn train_trend(
        &self,
        series: &RegularSeries,
        progress: &TrainingProgress,
        previous: Option<&ModelEnsemble>,
    ) -> Result<ModelEnsemble> {
        let rows = self.trend_rows(series)?;
        let windowing = self.trend_windowing(series)?;
        let learning_rate = self.learning_rate(progress)?;
        let warm = previous.filter(|_| progress.is_warm());
        let window = self.hyper.window_size_trend;

        let segments = rows
            .par_iter()
            .zip(windowing.into_par_iter())
            .enumerate()
            .map(|(k, (row, windowing))| -> Result<WeightSet> {
                let init = self.initial_weights(warm, k, window);
                let seed = self.seed(progress, k);
                self.train_segment(
                    k,
                    row,
                    windowing,
                    init,
                    self.hyper.gd_iterations,
                    learning_rate,
                    seed,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            segments = segments.len(),
            learning_rate,
            warm = warm.is_some(),
            "trend ensemble trained"
        );
        Ok(ModelEnsemble::new(segments))
    }

    /// Train one `WeightSet` per time-of-day bucket.
    ///
    /// `bucket_errors` are the per-bucket errors of the last validation;
    /// buckets that already validate well get fewer iterations.
    pub fn train_seasonality(
        &self,
        series: &RegularSeries,
        progress: &TrainingProgress,
        previous: Option<&ModelEnsemble>,
        bucket_errors: Option<&[f64]>,
    ) -> Result<ModelEnsemble> {
        let rows = self.seasonality_rows(series)?;
        let learning_rate = self.learning_rate(progress)?;
        let warm = previous.filter(|_| progress.is_warm());
        let window = self.hyper.window_size_seasonality;
        let iterations = dynamic_iterations(
            self.hyper.gd_iterations,
            self.hyper.max_iteration_factor,
            bucket_errors.filter(|_| progress.is_warm()),
            rows.len(),
        );

        let segments = rows
            .par_iter()
            .zip(iterations.par_iter())
            .enumerate()
            .map(|(b, (row, &epochs))| -> Result<WeightSet> {
                let windowing = Window::new(window)?;
                let init = self.initial_weights(warm, b, window);
                let seed = self.seed(progress, b);
                self.train_segment(b, row, windowing, init, epochs, learning_rate, seed)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            segments = segments.len(),
            learning_rate,
            warm = warm.is_some(),
            total_iterations = iterations.iter().sum::<usize>(),
            "seasonality ensemble trained"
        );
        Ok(ModelEnsemble::new(segments))
    }

    /// Previous generation's weights for `segment`, or fresh constants when
    /// there are none or they no longer fit the configuration
    fn initial_weights(
        &self,
        previous: Option<&ModelEnsemble>,
        segment: usize,
        window: usize,
    ) -> WeightSet {
        previous
            .and_then(|ensemble| ensemble.get(segment))
            .filter(|w| w.window_size() == window && w.variant() == self.hyper.gate)
            .cloned()
            .unwrap_or_else(|| {
                WeightSet::initial(
                    window,
                    &self.hyper.initial_weights,
                    self.hyper.initial_y,
                    self.hyper.initial_c,
                    self.hyper.gate,
                )
            })
    }

    fn seed(&self, progress: &TrainingProgress, segment: usize) -> Option<u64> {
        self.hyper.seed.map(|s| segment_seed(s, progress, segment))
    }

    #[allow(clippy::too_many_arguments)]
    fn train_segment<S: Stage + 'static>(
        &self,
        segment: usize,
        row: &[f64],
        windowing: S,
        init: WeightSet,
        epochs: usize,
        learning_rate: f64,
        seed: Option<u64>,
    ) -> Result<WeightSet> {
        let shuffle = seed.map(Shuffle::seeded).unwrap_or_default();
        let windows = Pipeline::new(Rank::Series)
            .then(windowing)?
            .then(Normalize::new())?
            .then(shuffle)?
            .run(Payload::Series(row.to_vec()))?
            .into_windowed()?;

        let config = NetworkConfig::new(self.hyper.gate)
            .with_learning_rate(learning_rate)
            .with_dropout(self.hyper.dropout)
            .with_seed(seed);
        let fit = SegmentTrainer::new(config, epochs).fit(&windows, &init)?;
        debug!(
            segment,
            windows = fit.windows,
            epochs,
            error = ?fit.error,
            "segment trained"
        );
        Ok(fit.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurrent_spi::{GateVariant, GateWeights};

    const STEP: i64 = 6 * 3600;

    fn hyper() -> HyperParameters {
        HyperParameters {
            interval_minutes: 360,
            trend_points: 2,
            window_size_trend: 3,
            window_size_seasonality: 2,
            gd_iterations: 4,
            epochs: 4,
            dropout: 0.0,
            seed: Some(7),
            ..HyperParameters::default()
        }
    }

    /// Four days of 4 samples per day
    fn series() -> RegularSeries {
        let timestamps: Vec<i64> = (0..16).map(|i| i * STEP).collect();
        let values = (0..16)
            .map(|i| 300.0 + 100.0 * ((i % 4) as f64) + 5.0 * i as f64)
            .collect();
        RegularSeries { timestamps, values }
    }

    #[test]
    fn test_trend_ensemble_shape() {
        let trainer = ModelTrainer::new(hyper()).unwrap();
        let ensemble = trainer
            .train_trend(&series(), &TrainingProgress::default(), None)
            .unwrap();
        assert_eq!(ensemble.len(), 2);
        for weights in ensemble.segments() {
            assert_eq!(weights.window_size(), 3);
            assert_eq!(weights.entry_count(), 10);
        }
    }

    #[test]
    fn test_seasonality_ensemble_shape() {
        let hp = HyperParameters {
            gate: GateVariant::Plain,
            ..hyper()
        };
        let trainer = ModelTrainer::new(hp).unwrap();
        let ensemble = trainer
            .train_seasonality(&series(), &TrainingProgress::default(), None, None)
            .unwrap();
        assert_eq!(ensemble.len(), 4);
        for weights in ensemble.segments() {
            assert_eq!(weights.window_size(), 2);
            assert_eq!(weights.entry_count(), 8);
        }
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let hp = HyperParameters {
            dropout: 0.3,
            ..hyper()
        };
        let trainer = ModelTrainer::new(hp).unwrap();
        let progress = TrainingProgress::default();
        let a = trainer.train_seasonality(&series(), &progress, None, None).unwrap();
        let b = trainer.train_seasonality(&series(), &progress, None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_training_moves_weights() {
        let trainer = ModelTrainer::new(hyper()).unwrap();
        let fresh = trainer.initial_weights(None, 0, 2);
        let ensemble = trainer
            .train_seasonality(&series(), &TrainingProgress::default(), None, None)
            .unwrap();
        assert_ne!(ensemble.get(0), Some(&fresh));
    }

    #[test]
    fn test_warm_start_uses_previous_generation() {
        let trainer = ModelTrainer::new(hyper()).unwrap();
        let marker = WeightSet::initial(
            3,
            &GateWeights::splat(0.05),
            0.1,
            0.1,
            GateVariant::ForgetGated,
        );
        let previous = ModelEnsemble::new(vec![marker.clone(), marker.clone()]);

        assert_eq!(trainer.initial_weights(Some(&previous), 1, 3), marker);
        // wrong window size falls back to fresh constants
        assert_ne!(trainer.initial_weights(Some(&previous), 1, 4).window_size(), 3);
        // missing segment falls back as well
        assert_eq!(
            trainer.initial_weights(Some(&previous), 5, 3).final_y()[0],
            0.2
        );
    }

    #[test]
    fn test_cold_progress_ignores_previous() {
        let trainer = ModelTrainer::new(hyper()).unwrap();
        let stale = ModelEnsemble::new(vec![
            WeightSet::initial(3, &GateWeights::splat(9.0), 0.0, 0.0, GateVariant::ForgetGated);
            2
        ]);
        let cold = TrainingProgress::default();
        let a = trainer.train_trend(&series(), &cold, Some(&stale)).unwrap();
        let b = trainer.train_trend(&series(), &cold, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_learning_rate_follows_round() {
        let trainer = ModelTrainer::new(hyper()).unwrap();
        let first = trainer.learning_rate(&TrainingProgress::default()).unwrap();
        let last = trainer
            .learning_rate(&TrainingProgress {
                epoch_index: 4,
                ..TrainingProgress::default()
            })
            .unwrap();
        assert!((first - 0.02).abs() < 1e-12);
        assert!((last - 0.00005).abs() < 1e-12);
    }

    #[test]
    fn test_rows_match_segments() {
        let trainer = ModelTrainer::new(hyper()).unwrap();
        assert_eq!(trainer.trend_rows(&series()).unwrap().len(), 2);
        let rows = trainer.seasonality_rows(&series()).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 4));
    }

    #[test]
    fn test_trend_windows_stay_on_their_offset() {
        // 48 buckets a day against 7 trend points
        let hp = HyperParameters {
            dropout: 0.0,
            seed: Some(1),
            ..HyperParameters::default()
        };
        let trainer = ModelTrainer::new(hp).unwrap();
        let timestamps: Vec<i64> = (0..4 * 48).map(|i| i * 1800).collect();
        let series = RegularSeries {
            values: vec![100.0; timestamps.len()],
            timestamps: timestamps.clone(),
        };
        let reshape = trainer.trend_reshape(&series).unwrap();
        let windowing = trainer.trend_windowing(&series).unwrap();
        assert_eq!(windowing.len(), 7);

        let index: Vec<f64> = (0..timestamps.len()).map(|i| i as f64).collect();
        let rows = reshape.reshape(&index).unwrap();
        for (k, (row, windows)) in rows.iter().zip(&windowing).enumerate() {
            let set = windows.build(row).unwrap();
            assert!(!set.is_empty());
            for target in set.targets() {
                let ts = timestamps[*target as usize];
                assert_eq!(trainer.calendar.horizon_offset(ts, 7), k);
            }
        }
    }

    #[test]
    fn test_seed_changes_with_round_and_batch() {
        let first = TrainingProgress::default();
        let next_batch = TrainingProgress {
            batch_index: 1,
            ..first
        };
        let next_round = TrainingProgress {
            epoch_index: 1,
            ..first
        };
        let seeds = [
            segment_seed(7, &first, 0),
            segment_seed(7, &next_batch, 0),
            segment_seed(7, &next_round, 0),
            segment_seed(7, &first, 1),
        ];
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(segment_seed(7, &next_round, 1), segment_seed(7, &next_round, 1));
    }

    #[test]
    fn test_rounds_draw_fresh_randomness() {
        let hp = HyperParameters {
            dropout: 0.3,
            ..hyper()
        };
        let trainer = ModelTrainer::new(hp).unwrap();
        let first = TrainingProgress::default();
        let later = TrainingProgress {
            epoch_index: 0,
            batch_index: 1,
            round_count: 0,
        };
        let a = trainer.train_seasonality(&series(), &first, None, None).unwrap();
        let b = trainer.train_seasonality(&series(), &later, None, None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hyperparameters_rejected() {
        let hp = HyperParameters {
            trend_points: 0,
            ..hyper()
        };
        assert!(ModelTrainer::new(hp).is_err());
    }
}
