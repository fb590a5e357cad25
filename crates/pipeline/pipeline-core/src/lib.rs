//! Pipeline Core
//!
//! Core types and utilities for preprocessing pipelines: the rank-checked
//! stage chain, the fixed-interval grid, time-of-day bucketing, batch
//! splitting and the statistics shared by every stage.

pub mod batch;
pub mod calendar;
pub mod pipeline;
pub mod regularizer;
pub mod statistics;

pub use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage, WindowSet};

pub use batch::{batch_sizes, split_into_batches};
pub use calendar::{TimeOfDay, MINUTES_PER_DAY, SECONDS_PER_DAY};
pub use pipeline::Pipeline;
pub use regularizer::{RegularSeries, TimeIndexRegularizer};
pub use statistics::{mae, mean, mse, rms, std_dev, ZStats, MIN_STD_DEV};
