//! Series correction shared by training and prediction

use forecast_spi::{HyperParameters, Result};
use pipeline_api::{
    Interpolate, MovingAverage, OutlierSquash, Scale, ScaleRange, ZeroToMissing,
};
use pipeline_core::{Pipeline, TimeOfDay};
use pipeline_spi::{Payload, Rank};

/// Time-of-day bucketing for the configured interval and UTC offset
pub fn calendar(hyper: &HyperParameters) -> Result<TimeOfDay> {
    Ok(TimeOfDay::new(hyper.interval_minutes, hyper.utc_offset_minutes)?)
}

/// Min-max bounds mapped onto the activation-friendly range
pub fn scale_range(hyper: &HyperParameters) -> Result<ScaleRange> {
    Ok(ScaleRange::new(hyper.scaling_min, hyper.scaling_max)?)
}

/// Series stages applied before any reshaping: near-zero masking,
/// interpolation, scaling, smoothing and outlier squashing.
pub fn correction_pipeline(hyper: &HyperParameters) -> Result<Pipeline> {
    let pipeline = Pipeline::new(Rank::Series)
        .then(ZeroToMissing::new())?
        .then(Interpolate::new())?
        .then(Scale::new(scale_range(hyper)?))?
        .then(MovingAverage::new(hyper.moving_average_window)?)?
        .then(OutlierSquash::new(hyper.outlier_multiplier)?)?;
    Ok(pipeline)
}

/// Run [`correction_pipeline`] over grid values (NaN for missing points)
pub fn correct(hyper: &HyperParameters, values: &[f64]) -> Result<Vec<f64>> {
    let payload = correction_pipeline(hyper)?.run(Payload::Series(values.to_vec()))?;
    Ok(payload.into_series()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_spi::PipelineError;
    use forecast_spi::ForecastError;

    #[test]
    fn test_correct_fills_and_scales() {
        let hyper = HyperParameters {
            moving_average_window: 1,
            ..HyperParameters::default()
        };
        let corrected = correct(&hyper, &[500.0, f64::NAN, 500.0, 0.0, 500.0]).unwrap();
        assert_eq!(corrected.len(), 5);
        for v in corrected {
            assert!((v - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_all_zero_is_all_missing() {
        let result = correct(&HyperParameters::default(), &[0.0, 0.0, 0.0]);
        assert!(matches!(
            result,
            Err(ForecastError::Pipeline(PipelineError::AllMissing))
        ));
    }

    #[test]
    fn test_pipeline_stage_order() {
        let pipeline = correction_pipeline(&HyperParameters::default()).unwrap();
        assert_eq!(pipeline.len(), 5);
        assert_eq!(pipeline.output_rank(), Rank::Series);
    }

    #[test]
    fn test_calendar_rejects_bad_interval() {
        let hyper = HyperParameters {
            interval_minutes: 7,
            ..HyperParameters::default()
        };
        assert!(calendar(&hyper).is_err());
    }
}
