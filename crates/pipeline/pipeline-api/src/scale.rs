//! Min-max scaling into a band that keeps activations out of saturation

use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};
use serde::{Deserialize, Serialize};

pub const SCALE_LOW: f64 = 0.2;
pub const SCALE_HIGH: f64 = 0.8;

/// The (min, max) pair that maps onto `[SCALE_LOW, SCALE_HIGH]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    min: f64,
    max: f64,
}

impl ScaleRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(max > min) {
            return Err(PipelineError::InvalidParameter {
                name: "max".to_string(),
                reason: format!("must exceed min ({})", min),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Values outside `[min, max]` extrapolate linearly, no clamping
    pub fn scale(&self, value: f64) -> f64 {
        SCALE_LOW + (value - self.min) / (self.max - self.min) * (SCALE_HIGH - SCALE_LOW)
    }

    pub fn unscale(&self, value: f64) -> f64 {
        (value - SCALE_LOW) / (SCALE_HIGH - SCALE_LOW) * (self.max - self.min) + self.min
    }
}

/// Map every value into `[0.2, 0.8]`
#[derive(Debug, Clone, Copy)]
pub struct Scale(ScaleRange);

impl Scale {
    pub fn new(range: ScaleRange) -> Self {
        Self(range)
    }

    pub fn range(&self) -> ScaleRange {
        self.0
    }
}

impl Stage for Scale {
    fn name(&self) -> &str {
        "scale"
    }

    fn accepts(&self, _rank: Rank) -> bool {
        true
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        let range = self.0;
        Ok(payload.map_values(|v| range.scale(v)))
    }
}

/// Exact inverse of [`Scale`] for the same range
#[derive(Debug, Clone, Copy)]
pub struct ReverseScale(ScaleRange);

impl ReverseScale {
    pub fn new(range: ScaleRange) -> Self {
        Self(range)
    }
}

impl Stage for ReverseScale {
    fn name(&self) -> &str {
        "reverse_scale"
    }

    fn accepts(&self, _rank: Rank) -> bool {
        true
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        let range = self.0;
        Ok(payload.map_values(|v| range.unscale(v)))
    }
}
