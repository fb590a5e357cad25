//! Shuffle step

use pipeline_spi::{Payload, Rank, Result, Stage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Randomly permute window/target pairs. Used for training only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shuffle {
    seed: Option<u64>,
}

impl Shuffle {
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Same permutation for the same seed and length
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Stage for Shuffle {
    fn name(&self) -> &str {
        "shuffle"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Windowed
    }

    fn output_rank(&self, input: Rank) -> Rank {
        input
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let windows = payload.into_windowed()?;
        let mut order: Vec<usize> = (0..windows.len()).collect();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        order.shuffle(&mut rng);
        Ok(Payload::Windowed(windows.reorder(&order)?))
    }
}
