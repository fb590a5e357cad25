//! Scoring candidate ensembles against held-out data

use crate::predictor::Predictor;
use crate::preprocess::calendar;
use forecast_spi::{ForecastError, HyperParameters, ModelEnsemble, Result};
use pipeline_core::{rms, RegularSeries, TimeOfDay};
use rayon::prelude::*;
use tracing::{info, warn};

/// Errors index-aligned with the validated candidates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    /// RMS error per candidate; NaN when nothing could be compared
    pub errors: Vec<f64>,
    /// Absolute error per segment, per candidate
    pub segment_errors: Vec<Vec<f64>>,
}

impl Validation {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Smallest finite error
    pub fn best_error(&self) -> Option<f64> {
        self.errors
            .iter()
            .copied()
            .filter(|e| e.is_finite())
            .min_by(f64::total_cmp)
    }

    fn collect(scored: Vec<(f64, Vec<f64>)>) -> Self {
        let (errors, segment_errors) = scored.into_iter().unzip();
        Self {
            errors,
            segment_errors,
        }
    }
}

fn score(actual: &[f64], predicted: &[f64]) -> Result<(f64, Vec<f64>)> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::Shape(format!(
            "{} actual values for {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    let absolute = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .collect();
    let error = match rms(actual, predicted) {
        Ok(error) => error,
        Err(e) => {
            warn!(error = %e, "nothing to compare, scoring candidate as NaN");
            f64::NAN
        }
    };
    Ok((error, absolute))
}

/// Runs the predictor over held-out data for every candidate
#[derive(Debug, Clone)]
pub struct Validator {
    predictor: Predictor,
    calendar: TimeOfDay,
}

impl Validator {
    pub fn new(hyper: HyperParameters) -> Result<Self> {
        let calendar = calendar(&hyper)?;
        Ok(Self {
            predictor: Predictor::new(hyper)?,
            calendar,
        })
    }

    /// Predict the last `trend_points` held-out values from the held-out
    /// history before them
    pub fn trend(&self, held_out: &RegularSeries, candidates: &[ModelEnsemble]) -> Result<Validation> {
        let horizon = self.predictor.hyper().trend_points;
        if held_out.len() <= horizon {
            return Err(ForecastError::Data(format!(
                "held-out data has {} points, trend validation needs more than {}",
                held_out.len(),
                horizon
            )));
        }
        let (history, actual) = held_out.split_at(held_out.len() - horizon);
        let origin = history
            .last_timestamp()
            .ok_or_else(|| ForecastError::Data("empty held-out history".to_string()))?;

        let scored = candidates
            .par_iter()
            .map(|candidate| {
                let forecast = self.predictor.trend(&history, origin, candidate)?;
                score(&actual.values, &forecast.values)
            })
            .collect::<Result<Vec<_>>>()?;

        let validation = Validation::collect(scored);
        info!(
            candidates = validation.len(),
            best = ?validation.best_error(),
            "trend candidates validated"
        );
        Ok(validation)
    }

    /// Predict one value per bucket from the held-out data and compare
    /// against the first held-out day
    pub fn seasonality(
        &self,
        held_out: &RegularSeries,
        candidates: &[ModelEnsemble],
    ) -> Result<Validation> {
        if held_out.is_empty() {
            return Err(ForecastError::Data("held-out data is empty".to_string()));
        }
        let buckets = self.calendar.buckets_per_day();
        let mut actual = vec![f64::NAN; buckets];
        for (&ts, &v) in held_out.timestamps.iter().zip(&held_out.values).take(buckets) {
            actual[self.calendar.bucket(ts)] = v;
        }

        let scored = candidates
            .par_iter()
            .map(|candidate| {
                let predicted = self.predictor.bucket_values(held_out, candidate)?;
                score(&actual, &predicted)
            })
            .collect::<Result<Vec<_>>>()?;

        let validation = Validation::collect(scored);
        info!(
            candidates = validation.len(),
            best = ?validation.best_error(),
            "seasonality candidates validated"
        );
        Ok(validation)
    }
}
