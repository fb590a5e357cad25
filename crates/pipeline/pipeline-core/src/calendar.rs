//! Time-of-day bucketing on the fixed-interval grid

use pipeline_spi::{PipelineError, Result};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MINUTES_PER_DAY: u32 = 1_440;

/// Maps epoch-second timestamps onto (hour, minute) buckets of one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    interval_minutes: u32,
    utc_offset_minutes: i32,
}

impl TimeOfDay {
    /// `interval_minutes` must divide a day evenly
    pub fn new(interval_minutes: u32, utc_offset_minutes: i32) -> Result<Self> {
        if interval_minutes == 0 || MINUTES_PER_DAY % interval_minutes != 0 {
            return Err(PipelineError::InvalidParameter {
                name: "interval_minutes".to_string(),
                reason: format!("must be a positive divisor of {}", MINUTES_PER_DAY),
            });
        }
        Ok(Self {
            interval_minutes,
            utc_offset_minutes,
        })
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    /// Grid step in seconds
    pub fn interval_seconds(&self) -> i64 {
        i64::from(self.interval_minutes) * 60
    }

    pub fn buckets_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.interval_minutes) as usize
    }

    /// Local (hour, minute) of a timestamp
    pub fn hour_minute(&self, timestamp: i64) -> (u32, u32) {
        let local = timestamp + i64::from(self.utc_offset_minutes) * 60;
        let minute_of_day = (local.rem_euclid(SECONDS_PER_DAY) / 60) as u32;
        (minute_of_day / 60, minute_of_day % 60)
    }

    /// Bucket index in `0..buckets_per_day()`
    pub fn bucket(&self, timestamp: i64) -> usize {
        let (hour, minute) = self.hour_minute(timestamp);
        ((hour * 60 + minute) / self.interval_minutes) as usize
    }

    /// Trend horizon offset of a timestamp in `0..trend_points`
    pub fn horizon_offset(&self, timestamp: i64, trend_points: usize) -> usize {
        if trend_points == 0 {
            return 0;
        }
        self.bucket(timestamp) % trend_points
    }
}
