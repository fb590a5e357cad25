//! Windowing steps

use pipeline_spi::{Payload, PipelineError, Rank, Result, Stage, WindowSet};

fn positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(PipelineError::InvalidParameter {
            name: name.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Slide a fixed window one position at a time, pairing each window with the
/// value that follows it
#[derive(Debug, Clone, Copy)]
pub struct Window {
    size: usize,
}

impl Window {
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            size: positive("size", size)?,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn build(&self, values: &[f64]) -> Result<WindowSet> {
        let (inputs, targets) = values
            .windows(self.size + 1)
            .map(|w| (w[..self.size].to_vec(), w[self.size]))
            .unzip();
        WindowSet::new(inputs, targets)
    }
}

impl Stage for Window {
    fn name(&self) -> &str {
        "window"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, _input: Rank) -> Rank {
        Rank::Windowed
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let values = payload.into_series()?;
        Ok(Payload::Windowed(self.build(&values)?))
    }
}

/// Trend windows whose inputs never reach the trailing `trend_points` values
/// of the series. Those values are only ever targets, and the first of them
/// may be the final window's target.
///
/// Built with [`StiffenedWindow::new`], windows advance `trend_points`
/// positions at a time. Built with [`StiffenedWindow::aligned`], every start
/// is considered and only windows whose target lies on the wanted horizon
/// offset are kept, so the targets stay on one offset even when the phase
/// shifts at midnight.
#[derive(Debug, Clone)]
pub struct StiffenedWindow {
    size: usize,
    trend_points: usize,
    alignment: Option<Alignment>,
}

#[derive(Debug, Clone)]
struct Alignment {
    offsets: Vec<usize>,
    offset: usize,
}

impl StiffenedWindow {
    pub fn new(size: usize, trend_points: usize) -> Result<Self> {
        Ok(Self {
            size: positive("size", size)?,
            trend_points: positive("trend_points", trend_points)?,
            alignment: None,
        })
    }

    /// Keep only windows whose target index `t` has `offsets[t] == offset`
    pub fn aligned(
        size: usize,
        trend_points: usize,
        offsets: Vec<usize>,
        offset: usize,
    ) -> Result<Self> {
        Ok(Self {
            alignment: Some(Alignment { offsets, offset }),
            ..Self::new(size, trend_points)?
        })
    }

    pub fn build(&self, values: &[f64]) -> Result<WindowSet> {
        if let Some(alignment) = &self.alignment {
            if alignment.offsets.len() != values.len() {
                return Err(PipelineError::LengthMismatch {
                    expected: alignment.offsets.len(),
                    actual: values.len(),
                });
            }
        }
        let step = if self.alignment.is_some() {
            1
        } else {
            self.trend_points
        };
        let body = values.len().saturating_sub(self.trend_points);
        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        let mut start = 0;
        while start + self.size <= body {
            let target = start + self.size;
            let keep = self
                .alignment
                .as_ref()
                .map_or(true, |a| a.offsets[target] == a.offset);
            if keep {
                inputs.push(values[start..target].to_vec());
                targets.push(values[target]);
            }
            start += step;
        }
        WindowSet::new(inputs, targets)
    }
}

impl Stage for StiffenedWindow {
    fn name(&self) -> &str {
        "stiffened_window"
    }

    fn accepts(&self, rank: Rank) -> bool {
        rank == Rank::Series
    }

    fn output_rank(&self, _input: Rank) -> Rank {
        Rank::Windowed
    }

    fn apply(&self, payload: Payload) -> Result<Payload> {
        self.check(&payload)?;
        let values = payload.into_series()?;
        Ok(Payload::Windowed(self.build(&values)?))
    }
}
