//! Inference over trained ensembles

use crate::preprocess::{calendar, correct, correction_pipeline, scale_range};
use forecast_spi::{ForecastError, HyperParameters, ModelEnsemble, ModelState, Result};
use pipeline_api::{GroupByTimeOfDay, Normalize, ReverseNormalize, ReverseScale, ScaleRange};
use pipeline_core::{Pipeline, RegularSeries, TimeIndexRegularizer, TimeOfDay, ZStats};
use pipeline_spi::{Payload, Rank};
use rayon::prelude::*;
use recurrent_core::forward_only;
use recurrent_spi::WeightSet;
use serde::{Deserialize, Serialize};

/// Forecast values on the regular grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}

fn expect_segments(ensemble: &ModelEnsemble, expected: usize, model: &str) -> Result<()> {
    if ensemble.len() != expected {
        return Err(ForecastError::Shape(format!(
            "{} ensemble has {} segments, expected {}",
            model,
            ensemble.len(),
            expected
        )));
    }
    Ok(())
}

/// Forward-only passes through trained ensembles with the same correction
/// chain used in training
#[derive(Debug, Clone)]
pub struct Predictor {
    hyper: HyperParameters,
    calendar: TimeOfDay,
    range: ScaleRange,
    regularizer: TimeIndexRegularizer,
}

impl Predictor {
    pub fn new(hyper: HyperParameters) -> Result<Self> {
        hyper.validate()?;
        Ok(Self {
            calendar: calendar(&hyper)?,
            range: scale_range(&hyper)?,
            regularizer: TimeIndexRegularizer::new(hyper.interval_minutes)?,
            hyper,
        })
    }

    pub fn hyper(&self) -> &HyperParameters {
        &self.hyper
    }

    /// Place raw observations on the grid, rejecting input with nothing to
    /// predict from
    pub fn regularize(&self, series: &[f64], timestamps: &[i64]) -> Result<RegularSeries> {
        let regular = self.regularizer.regularize(timestamps, series)?;
        if regular.is_empty() {
            return Err(ForecastError::Data("no observations".to_string()));
        }
        if regular.valid_count() == 0 {
            return Err(ForecastError::Data("every value is missing".to_string()));
        }
        Ok(regular)
    }

    /// One prediction per time-of-day bucket, in bucket order. Buckets
    /// without history predict NaN.
    pub fn bucket_values(&self, series: &RegularSeries, ensemble: &ModelEnsemble) -> Result<Vec<f64>> {
        expect_segments(ensemble, self.calendar.buckets_per_day(), "seasonality")?;
        let rows = correction_pipeline(&self.hyper)?
            .then(GroupByTimeOfDay::new(series.timestamps.clone(), self.calendar))?
            .run(Payload::Series(series.values.clone()))?
            .into_grouped()?;

        rows.par_iter()
            .zip(ensemble.segments().par_iter())
            .map(|(row, weights)| self.predict_row(row, weights))
            .collect()
    }

    /// Expected value for each grid point of the day after the last
    /// observation
    pub fn seasonality(&self, series: &RegularSeries, ensemble: &ModelEnsemble) -> Result<Forecast> {
        let by_bucket = self.bucket_values(series, ensemble)?;
        let last = series
            .last_timestamp()
            .ok_or_else(|| ForecastError::Data("no observations".to_string()))?;
        let step = self.hyper.interval_seconds();

        let timestamps: Vec<i64> = (1..=by_bucket.len() as i64).map(|j| last + j * step).collect();
        let values = timestamps
            .iter()
            .map(|&ts| by_bucket[self.calendar.bucket(ts)])
            .collect();
        Ok(Forecast { timestamps, values })
    }

    /// Roll the trend ensemble `trend_points` steps past `origin`.
    ///
    /// Each forecast timestamp selects the segment for its horizon offset;
    /// every prediction is fed back into the window for the next step.
    pub fn trend(
        &self,
        series: &RegularSeries,
        origin: i64,
        ensemble: &ModelEnsemble,
    ) -> Result<Forecast> {
        let horizon = self.hyper.trend_points;
        expect_segments(ensemble, horizon, "trend")?;

        let corrected = correct(&self.hyper, &series.values)?;
        let stats = ZStats::from_values(&corrected)?;
        let normalized = Pipeline::new(Rank::Series)
            .then(Normalize::with_stats(stats))?
            .run(Payload::Series(corrected))?
            .into_series()?;

        let size = self.hyper.window_size_trend;
        let mut window = normalized[normalized.len().saturating_sub(size)..].to_vec();
        let step = self.hyper.interval_seconds();
        let mut timestamps = Vec::with_capacity(horizon);
        let mut predictions = Vec::with_capacity(horizon);
        for j in 1..=horizon as i64 {
            let ts = origin + j * step;
            let offset = self.calendar.horizon_offset(ts, horizon);
            let weights = ensemble.get(offset).ok_or_else(|| {
                ForecastError::Shape(format!("no trend segment for offset {}", offset))
            })?;
            let y = forward_only(weights, &window, self.hyper.initial_y, self.hyper.initial_c)?;
            if window.len() >= size {
                window.remove(0);
            }
            window.push(y);
            timestamps.push(ts);
            predictions.push(y);
        }

        Ok(Forecast {
            timestamps,
            values: self.restore(predictions, stats)?,
        })
    }

    fn predict_row(&self, row: &[f64], weights: &WeightSet) -> Result<f64> {
        if row.is_empty() {
            return Ok(f64::NAN);
        }
        let stats = ZStats::from_values(row)?;
        let normalized = Pipeline::new(Rank::Series)
            .then(Normalize::with_stats(stats))?
            .run(Payload::Series(row.to_vec()))?
            .into_series()?;
        let y = forward_only(weights, &normalized, self.hyper.initial_y, self.hyper.initial_c)?;
        let restored = self.restore(vec![y], stats)?;
        Ok(restored.first().copied().unwrap_or(f64::NAN))
    }

    /// Undo normalization, then scaling
    fn restore(&self, values: Vec<f64>, stats: ZStats) -> Result<Vec<f64>> {
        let payload = Pipeline::new(Rank::Series)
            .then(ReverseNormalize::new(stats))?
            .then(ReverseScale::new(self.range))?
            .run(Payload::Series(values))?;
        Ok(payload.into_series()?)
    }
}

/// Seasonality forecast for the day after `timestamps` using the state's
/// best ensemble
pub fn predict_seasonality(
    series: &[f64],
    timestamps: &[i64],
    state: &ModelState,
) -> Result<Forecast> {
    let ensemble = state.best_seasonality().ok_or_else(|| {
        ForecastError::Data(format!("model '{}' has no seasonality ensemble", state.name))
    })?;
    let predictor = Predictor::new(state.hyper.clone())?;
    let regular = predictor.regularize(series, timestamps)?;
    predictor.seasonality(&regular, ensemble)
}

/// `trend_points` trend values past `until`, predicted from the
/// observations at or before it
pub fn predict_trend(
    series: &[f64],
    timestamps: &[i64],
    until: i64,
    state: &ModelState,
) -> Result<Forecast> {
    let ensemble = state.best_trend().ok_or_else(|| {
        ForecastError::Data(format!("model '{}' has no trend ensemble", state.name))
    })?;
    if series.len() != timestamps.len() {
        return Err(ForecastError::Shape(format!(
            "{} values for {} timestamps",
            series.len(),
            timestamps.len()
        )));
    }
    let (kept_ts, kept): (Vec<i64>, Vec<f64>) = timestamps
        .iter()
        .zip(series)
        .filter(|(ts, _)| **ts <= until)
        .map(|(&ts, &v)| (ts, v))
        .unzip();

    let predictor = Predictor::new(state.hyper.clone())?;
    let regular = predictor.regularize(&kept, &kept_ts)?;
    predictor.trend(&regular, until, ensemble)
}
