//! Turning raw observations into training and held-out series

use crate::config::TrainingConfig;
use forecast_spi::{ForecastError, HyperParameters, Result};
use pipeline_api::RemoveNegatives;
use pipeline_core::{Pipeline, RegularSeries, TimeIndexRegularizer, SECONDS_PER_DAY};
use pipeline_spi::{Payload, Rank};
use tracing::debug;

/// Regularized data split for one training call
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub training: RegularSeries,
    pub held_out: RegularSeries,
}

fn clamp_negatives(series: RegularSeries) -> Result<RegularSeries> {
    let values = Pipeline::new(Rank::Series)
        .then(RemoveNegatives::new())?
        .run(Payload::Series(series.values))?
        .into_series()?;
    Ok(RegularSeries {
        timestamps: series.timestamps,
        values,
    })
}

/// Regularize, trim to `history_days`, split and check the missing share.
///
/// Empty or all-missing input is a [`ForecastError::Data`]; a training
/// portion missing more than `max_missing_ratio` of its points is
/// [`ForecastError::TooManyMissing`]. Negative readings become zero.
pub fn prepare(
    series: &[f64],
    timestamps: &[i64],
    hyper: &HyperParameters,
    config: &TrainingConfig,
) -> Result<PreparedData> {
    if series.is_empty() {
        return Err(ForecastError::Data("no observations".to_string()));
    }
    let regularizer = TimeIndexRegularizer::new(hyper.interval_minutes)?;
    let mut regular = regularizer.regularize(timestamps, series)?;
    if let Some(days) = config.history_days {
        let points = i64::from(days) * SECONDS_PER_DAY / hyper.interval_seconds();
        regular = regular.tail(points as usize);
    }
    if regular.valid_count() == 0 {
        return Err(ForecastError::Data("every value is missing".to_string()));
    }

    let split = (regular.len() as f64 * config.train_split).floor() as usize;
    let (training, held_out) = regular.split_at(split);
    if training.is_empty() || held_out.is_empty() {
        return Err(ForecastError::Data(format!(
            "{} grid points cannot be split for training and validation",
            regular.len()
        )));
    }
    let missing = training.missing_ratio();
    if missing > config.max_missing_ratio {
        return Err(ForecastError::TooManyMissing {
            missing: missing * 100.0,
            total: training.len(),
        });
    }
    debug!(
        training = training.len(),
        held_out = held_out.len(),
        missing,
        "data prepared"
    );

    Ok(PreparedData {
        training: clamp_negatives(training)?,
        held_out: clamp_negatives(held_out)?,
    })
}
