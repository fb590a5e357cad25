//! Pipeline stage implementations
//!
//! This crate provides the preprocessing stages:
//!
//! - [`Interpolate`]: fill missing grid points
//! - [`ZeroToMissing`]: treat near-zero readings as missing
//! - [`RemoveNegatives`]: clamp negative readings to zero
//! - [`MovingAverage`]: trailing-window smoothing
//! - [`OutlierSquash`]: compress IQR outliers with `tanh`
//! - [`Scale`] / [`ReverseScale`]: min-max mapping into `[0.2, 0.8]`
//! - [`GroupByTimeOfDay`]: one row per (hour, minute) bucket
//! - [`Normalize`] / [`ReverseNormalize`]: z-score standardization
//! - [`Window`] / [`StiffenedWindow`]: (history, next value) pairs
//! - [`Shuffle`]: random permutation of window pairs
//! - [`TrendReshape`]: one row per trend horizon offset

mod group;
mod interpolate;
mod missing;
mod moving_average;
mod normalize;
mod outlier;
mod scale;
mod shuffle;
mod trend;
mod window;

// Re-export from core
pub use pipeline_core::{
    Pipeline, Payload, PipelineError, Rank, RegularSeries, Result, TimeIndexRegularizer,
    TimeOfDay, WindowSet, ZStats,
};

// Re-export traits from SPI
pub use pipeline_spi::Stage;

// Re-export implementations
pub use group::GroupByTimeOfDay;
pub use interpolate::Interpolate;
pub use missing::{RemoveNegatives, ZeroToMissing, NEAR_ZERO};
pub use moving_average::MovingAverage;
pub use normalize::{Normalize, ReverseNormalize};
pub use outlier::{detect_outliers, OutlierSquash};
pub use scale::{Scale, ReverseScale, ScaleRange, SCALE_HIGH, SCALE_LOW};
pub use shuffle::Shuffle;
pub use trend::TrendReshape;
pub use window::{StiffenedWindow, Window};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::Stage;
    pub use crate::{
        GroupByTimeOfDay, Interpolate, MovingAverage, Normalize, OutlierSquash, RemoveNegatives,
        ReverseNormalize, ReverseScale, Scale, Shuffle, StiffenedWindow, TrendReshape, Window,
        ZeroToMissing,
    };
    pub use crate::{Payload, Pipeline, PipelineError, Rank, Result, WindowSet, ZStats};
}
