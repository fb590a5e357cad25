//! Tagged pipeline payload

use super::{Rank, WindowSet};
use crate::error::{PipelineError, Result};

/// Numeric data flowing between stages.
///
/// Each variant carries one logical rank, so a stage can state exactly what
/// it consumes and produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Flat series on the regular grid
    Series(Vec<f64>),
    /// One row per bucket or horizon offset
    Grouped(Vec<Vec<f64>>),
    /// Windows with their next-value targets
    Windowed(WindowSet),
}

impl Payload {
    pub fn rank(&self) -> Rank {
        match self {
            Payload::Series(_) => Rank::Series,
            Payload::Grouped(_) => Rank::Grouped,
            Payload::Windowed(_) => Rank::Windowed,
        }
    }

    /// Outer length: points, rows, or window pairs
    pub fn len(&self) -> usize {
        match self {
            Payload::Series(values) => values.len(),
            Payload::Grouped(rows) => rows.len(),
            Payload::Windowed(windows) => windows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All numbers of the payload in storage order
    pub fn flatten(&self) -> Vec<f64> {
        match self {
            Payload::Series(values) => values.clone(),
            Payload::Grouped(rows) => rows.iter().flatten().copied().collect(),
            Payload::Windowed(windows) => windows.values(),
        }
    }

    /// Apply `f` to every number, keeping the rank and shape
    pub fn map_values<F: Fn(f64) -> f64>(self, f: F) -> Self {
        match self {
            Payload::Series(values) => Payload::Series(values.into_iter().map(f).collect()),
            Payload::Grouped(rows) => Payload::Grouped(
                rows.into_iter()
                    .map(|row| row.into_iter().map(&f).collect())
                    .collect(),
            ),
            Payload::Windowed(windows) => Payload::Windowed(windows.map_values(f)),
        }
    }

    pub fn into_series(self) -> Result<Vec<f64>> {
        match self {
            Payload::Series(values) => Ok(values),
            other => Err(Self::unexpected("into_series", &other)),
        }
    }

    pub fn into_grouped(self) -> Result<Vec<Vec<f64>>> {
        match self {
            Payload::Grouped(rows) => Ok(rows),
            other => Err(Self::unexpected("into_grouped", &other)),
        }
    }

    pub fn into_windowed(self) -> Result<WindowSet> {
        match self {
            Payload::Windowed(windows) => Ok(windows),
            other => Err(Self::unexpected("into_windowed", &other)),
        }
    }

    fn unexpected(stage: &str, payload: &Payload) -> PipelineError {
        PipelineError::RankMismatch {
            stage: stage.to_string(),
            actual: payload.rank(),
        }
    }
}

impl From<Vec<f64>> for Payload {
    fn from(values: Vec<f64>) -> Self {
        Payload::Series(values)
    }
}

impl From<Vec<Vec<f64>>> for Payload {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Payload::Grouped(rows)
    }
}

impl From<WindowSet> for Payload {
    fn from(windows: WindowSet) -> Self {
        Payload::Windowed(windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_per_variant() {
        assert_eq!(Payload::from(vec![1.0]).rank(), Rank::Series);
        assert_eq!(Payload::from(vec![vec![1.0]]).rank(), Rank::Grouped);
        assert_eq!(Payload::from(WindowSet::default()).rank(), Rank::Windowed);
    }

    #[test]
    fn test_flatten_grouped() {
        let payload = Payload::Grouped(vec![vec![1.0, 2.0], vec![], vec![3.0]]);
        assert_eq!(payload.flatten(), vec![1.0, 2.0, 3.0]);
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn test_map_values_keeps_shape() {
        let payload = Payload::Grouped(vec![vec![1.0, 2.0], vec![3.0]]);
        let mapped = payload.map_values(|v| v + 1.0);
        assert_eq!(mapped, Payload::Grouped(vec![vec![2.0, 3.0], vec![4.0]]));
    }

    #[test]
    fn test_into_wrong_variant_fails() {
        let err = Payload::Series(vec![1.0]).into_grouped().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RankMismatch {
                actual: Rank::Series,
                ..
            }
        ));
    }
}
