//! Stage trait definition

use crate::error::{PipelineError, Result};
use crate::model::{Payload, Rank};

/// One transformation of a preprocessing pipeline.
///
/// A stage declares which payload ranks it accepts and what rank it emits for
/// each, so that a chain can be validated before any data flows through it.
pub trait Stage: Send + Sync {
    /// Name of this stage
    fn name(&self) -> &str;

    /// Whether the stage can consume a payload of `rank`
    fn accepts(&self, rank: Rank) -> bool;

    /// Rank produced for an accepted input rank
    fn output_rank(&self, input: Rank) -> Rank;

    /// Transform the payload
    fn apply(&self, payload: Payload) -> Result<Payload>;

    /// Fail fast when `payload` has a rank this stage does not accept
    fn check(&self, payload: &Payload) -> Result<()> {
        if self.accepts(payload.rank()) {
            Ok(())
        } else {
            Err(PipelineError::RankMismatch {
                stage: self.name().to_string(),
                actual: payload.rank(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Stage for Doubler {
        fn name(&self) -> &str {
            "doubler"
        }

        fn accepts(&self, rank: Rank) -> bool {
            rank == Rank::Series
        }

        fn output_rank(&self, input: Rank) -> Rank {
            input
        }

        fn apply(&self, payload: Payload) -> Result<Payload> {
            self.check(&payload)?;
            Ok(payload.map_values(|v| v * 2.0))
        }
    }

    #[test]
    fn test_check_accepts_declared_rank() {
        let stage = Doubler;
        let out = stage.apply(Payload::Series(vec![1.0, 2.0])).unwrap();
        assert_eq!(out, Payload::Series(vec![2.0, 4.0]));
    }

    #[test]
    fn test_check_rejects_other_rank() {
        let stage = Doubler;
        let err = stage.apply(Payload::Grouped(vec![vec![1.0]])).unwrap_err();
        assert_eq!(
            err,
            PipelineError::RankMismatch {
                stage: "doubler".to_string(),
                actual: Rank::Grouped,
            }
        );
    }

    #[test]
    fn test_stage_is_object_safe() {
        let stages: Vec<Box<dyn Stage>> = vec![Box::new(Doubler)];
        assert_eq!(stages[0].name(), "doubler");
        assert_eq!(stages[0].output_rank(Rank::Series), Rank::Series);
    }
}
