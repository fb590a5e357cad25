//! End-to-end tests for rustful-lstm
//!
//! Train from raw observations, persist, reload and predict using only
//! this crate's API.

use forecast_facade::prelude::*;
use forecast_facade::recurrent::GateVariant;

const STEP: i64 = 3600;

fn hyper() -> HyperParameters {
    HyperParameters {
        interval_minutes: 60,
        trend_points: 6,
        window_size_trend: 6,
        window_size_seasonality: 3,
        gd_iterations: 4,
        epochs: 2,
        patience: 2,
        dropout: 0.1,
        seed: Some(2024),
        gate: GateVariant::ForgetGated,
        ..HyperParameters::default()
    }
}

/// Twelve days of hourly readings with a few gaps, a spike and negatives
fn observations() -> (Vec<f64>, Vec<i64>) {
    let mut values = Vec::new();
    let mut timestamps = Vec::new();
    for i in 0..12 * 24i64 {
        if i % 37 == 5 {
            continue;
        }
        let hour = (i % 24) as f64;
        let mut v = 300.0 + 120.0 * (hour / 24.0 * std::f64::consts::TAU).cos() + 0.5 * i as f64;
        if i == 100 {
            v = 9_000.0;
        }
        if i == 150 {
            v = -20.0;
        }
        // irregular sampling jitter
        timestamps.push(1_700_000_000 - 1_700_000_000 % 86_400 + i * STEP + (i % 3) * 60);
        values.push(v);
    }
    (values, timestamps)
}

#[test]
fn e2e_train_persist_predict() {
    let dir = tempfile::tempdir().unwrap();
    let (values, timestamps) = observations();

    let driver =
        TrainingDriver::new(FileStateStore::new(dir.path()), TrainingConfig::new("site")).unwrap();
    let mut state = driver.load_state(hyper());
    let report = driver.train(&mut state, &values, &timestamps).unwrap();
    assert!(report.rounds >= 1);
    assert_eq!(state.progress.epoch_index, 0);

    // a second store over the same directory sees the saved state
    let reloaded = FileStateStore::new(dir.path()).load("site").unwrap();
    assert_eq!(reloaded.hyper, state.hyper);
    assert_eq!(reloaded.progress, state.progress);
    assert_eq!(reloaded.trend.candidates(), state.trend.candidates());
    assert_eq!(reloaded.seasonality.candidates(), state.seasonality.candidates());
    assert_eq!(reloaded.trend.len(), 1);

    let last = *timestamps.last().unwrap();
    let trend = predict_trend(&values, &timestamps, last, &reloaded).unwrap();
    assert_eq!(trend.len(), 6);
    assert_eq!(trend.timestamps[0], last + STEP);
    assert!(trend.values.iter().all(|v| v.is_finite()));

    let daily = predict_seasonality(&values, &timestamps, &reloaded).unwrap();
    assert_eq!(daily.len(), 24);
    assert!(daily.values.iter().all(|v| v.is_finite()));
}

#[test]
fn e2e_resume_is_warm() {
    let store = MemoryStateStore::new();
    let driver = TrainingDriver::new(store, TrainingConfig::new("resume")).unwrap();
    let (values, timestamps) = observations();

    let mut state = driver.load_state(hyper());
    driver.train_once(&mut state, &values, &timestamps).unwrap();
    assert_eq!(state.progress.round_count, 1);

    let mut resumed = driver.load_state(HyperParameters::default());
    assert_eq!(resumed.hyper, hyper());
    let report = driver.train_once(&mut resumed, &values, &timestamps).unwrap();
    assert_eq!(report.rounds, 1);
    // epochs = 2: the second round completes the budget
    assert_eq!(resumed.progress.epoch_index, 0);
    assert_eq!(resumed.trend.len(), 1);
}

#[test]
fn e2e_corrupt_state_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("lstm")).unwrap();
    std::fs::write(dir.path().join("lstm").join("broken"), b"{not json").unwrap();

    let driver =
        TrainingDriver::new(FileStateStore::new(dir.path()), TrainingConfig::new("broken")).unwrap();
    let state = driver.load_state(hyper());
    assert_eq!(state.name, "broken");
    assert!(state.trend.is_empty());
    assert_eq!(state.progress, Default::default());
}

#[test]
fn e2e_unusable_input_is_refused() {
    let driver =
        TrainingDriver::new(MemoryStateStore::new(), TrainingConfig::new("empty")).unwrap();
    let mut state = driver.load_state(hyper());

    assert!(matches!(
        driver.train_once(&mut state, &[], &[]),
        Err(ForecastError::Data(_))
    ));
    let zeros = vec![f64::NAN; 48];
    let timestamps: Vec<i64> = (0..48).map(|i| i * STEP).collect();
    assert!(matches!(
        driver.train_once(&mut state, &zeros, &timestamps),
        Err(ForecastError::Data(_))
    ));
}
