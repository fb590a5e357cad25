//! Interpolate step

use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};

/// Fill missing grid points.
///
/// Gaps between two known values are filled linearly; leading and trailing
/// gaps take the nearest known value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolate;

impl Interpolate {
    pub fn new() -> Self {
        Self
    }

    pub fn fill(&self, data: &[f64]) -> Result<Vec<f64>> {
        if data.is_empty() {
            return Err(PipelineError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let known: Vec<usize> = (0..data.len()).filter(|&i| data[i].is_finite()).collect();
        if known.is_empty() {
            return Err(PipelineError::AllMissing);
        }

        let mut out = data.to_vec();
        let first = known[0];
        let last = known[known.len() - 1];
        out[..first].fill(data[first]);
        out[last + 1..].fill(data[last]);

        for pair in known.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b - a < 2 {
                continue;
            }
            let span = (b - a) as f64;
            for i in a + 1..b {
                let t = (i - a) as f64 / span;
                out[i] = data[a] + t * (data[b] - data[a]);
            }
        }
        Ok(out)
    }
}

impl Stage for Interpolate {
    fn name(&self) -> &str {
        "interpolate"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let values = payload.into_series()?;
        Ok(Payload::Series(self.fill(&values)?))
    }
}
