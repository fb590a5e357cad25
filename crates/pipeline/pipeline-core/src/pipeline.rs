//! Composable preprocessing pipeline

use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage};

/// Ordered chain of stages with a declared input rank.
///
/// Every attached stage is checked against the rank produced by the stage
/// before it, so an invalid ordering is rejected while the pipeline is being
/// built rather than when data reaches the offending stage.
pub struct Pipeline {
    input: Rank,
    output: Rank,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(input: Rank) -> Self {
        Self {
            input,
            output: input,
            stages: Vec::new(),
        }
    }

    /// Attach a stage, failing if it cannot consume the current output rank
    pub fn add_stage(&mut self, stage: Box<dyn Stage>) -> Result<()> {
        if !stage.accepts(self.output) {
            return Err(PipelineError::StageOrder {
                stage: stage.name().to_string(),
                produced: self.output,
            });
        }
        self.output = stage.output_rank(self.output);
        self.stages.push(stage);
        Ok(())
    }

    /// Builder form of [`Pipeline::add_stage`]
    pub fn then<S: Stage + 'static>(mut self, stage: S) -> Result<Self> {
        self.add_stage(Box::new(stage))?;
        Ok(self)
    }

    pub fn input_rank(&self) -> Rank {
        self.input
    }

    pub fn output_rank(&self) -> Rank {
        self.output
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in attachment order
    pub fn run(&self, payload: Payload) -> Result<Payload> {
        if payload.rank() != self.input {
            return Err(PipelineError::RankMismatch {
                stage: "pipeline".to_string(),
                actual: payload.rank(),
            });
        }
        self.stages
            .iter()
            .try_fold(payload, |current, stage| stage.apply(current))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("stages", &self.stage_names())
            .finish()
    }
}
