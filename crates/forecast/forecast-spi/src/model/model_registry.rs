//! Candidate ensembles and their validation errors

use super::ModelEnsemble;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Candidate ensembles with index-aligned RMS errors.
///
/// `errors[i]` and `segment_errors[i]` always belong to `candidates[i]`.
/// Several candidates coexist between a training batch and the next
/// selection; [`ModelRegistry::retain_best`] collapses them to one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    candidates: Vec<ModelEnsemble>,
    #[serde(with = "nan_as_null")]
    errors: Vec<f64>,
    #[serde(default, with = "nested_nan_as_null")]
    segment_errors: Vec<Vec<f64>>,
}

/// JSON has no NaN; unknown errors are written as `null`
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

mod nested_nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        rows.iter()
            .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
            .collect::<Vec<Vec<Option<f64>>>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<f64>>, D::Error> {
        let raw = Vec::<Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated candidate
    pub fn push(&mut self, candidate: ModelEnsemble, error: f64, segment_errors: Vec<f64>) {
        self.candidates.push(candidate);
        self.errors.push(error);
        self.segment_errors.push(segment_errors);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[ModelEnsemble] {
        &self.candidates
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Index of the smallest error; NaN ranks last and ties keep the earliest
    pub fn best_index(&self) -> Option<usize> {
        self.errors
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let a = if a.is_nan() { f64::INFINITY } else { **a };
                let b = if b.is_nan() { f64::INFINITY } else { **b };
                a.total_cmp(&b)
            })
            .map(|(i, _)| i)
    }

    pub fn best(&self) -> Option<&ModelEnsemble> {
        self.best_index().and_then(|i| self.candidates.get(i))
    }

    pub fn best_error(&self) -> Option<f64> {
        self.best_index().and_then(|i| self.errors.get(i).copied())
    }

    /// Most recently appended candidate; the warm-start source
    pub fn latest(&self) -> Option<&ModelEnsemble> {
        self.candidates.last()
    }

    /// Per-segment errors recorded for the latest candidate
    pub fn latest_segment_errors(&self) -> Option<&[f64]> {
        self.segment_errors.last().map(Vec::as_slice)
    }

    /// Keep only the arg-min candidate and its error
    pub fn retain_best(&mut self) {
        let Some(best) = self.best_index() else {
            return;
        };
        let candidate = self.candidates.swap_remove(best);
        let error = self.errors[best];
        let segment = self.segment_errors.get(best).cloned().unwrap_or_default();
        self.candidates = vec![candidate];
        self.errors = vec![error];
        self.segment_errors = vec![segment];
    }

    /// Keep only candidates accepted by `keep`, with their errors. Returns
    /// the number removed.
    pub fn retain_candidates<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ModelEnsemble) -> bool,
    {
        let before = self.candidates.len();
        let mut segment_errors = std::mem::take(&mut self.segment_errors).into_iter();
        let entries: Vec<_> = std::mem::take(&mut self.candidates)
            .into_iter()
            .zip(std::mem::take(&mut self.errors))
            .map(|(candidate, error)| {
                let segment = segment_errors.next().unwrap_or_default();
                (candidate, error, segment)
            })
            .filter(|(candidate, _, _)| keep(candidate))
            .collect();
        for (candidate, error, segment) in entries {
            self.push(candidate, error, segment);
        }
        before - self.candidates.len()
    }

    /// Replace every error after re-validating the existing candidates
    pub fn replace_errors(&mut self, errors: Vec<f64>, segment_errors: Vec<Vec<f64>>) -> Result<()> {
        if errors.len() != self.candidates.len() || segment_errors.len() != self.candidates.len() {
            return Err(ForecastError::Shape(format!(
                "{} candidates but {} errors and {} segment error rows",
                self.candidates.len(),
                errors.len(),
                segment_errors.len()
            )));
        }
        self.errors = errors;
        self.segment_errors = segment_errors;
        Ok(())
    }
}
