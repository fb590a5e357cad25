//! Trained parameters of one unrolled unit

use super::{GateVariant, GateWeights};
use crate::error::{RecurrentError, Result};
use serde::{Deserialize, Serialize};

/// Forget-gate parameter vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgetWeights {
    pub wf: Vec<f64>,
    pub rf: Vec<f64>,
}

/// Parameters of one trained network, one vector per parameter indexed by
/// time step, plus the hidden and cell state recorded at each step.
///
/// Entry order is `Wi, Wo, Wz, Ri, Ro, Rz, finalY, finalC` followed by
/// `Wf, Rf` for the forget-gated variant, so a set always has 8 or 10
/// entries whatever its window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    wi: Vec<f64>,
    wo: Vec<f64>,
    wz: Vec<f64>,
    ri: Vec<f64>,
    ro: Vec<f64>,
    rz: Vec<f64>,
    final_y: Vec<f64>,
    final_c: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forget: Option<ForgetWeights>,
}

impl WeightSet {
    /// Fresh parameters: every step gets the tied constants and the given
    /// starting state
    pub fn initial(
        window_size: usize,
        weights: &GateWeights,
        initial_y: f64,
        initial_c: f64,
        variant: GateVariant,
    ) -> Self {
        Self::from_tied(
            weights,
            vec![initial_y; window_size],
            vec![initial_c; window_size],
            variant,
        )
    }

    /// Expand tied weights over the steps covered by `final_y`
    pub fn from_tied(
        weights: &GateWeights,
        final_y: Vec<f64>,
        final_c: Vec<f64>,
        variant: GateVariant,
    ) -> Self {
        let n = final_y.len();
        let forget = variant.has_forget_gate().then(|| ForgetWeights {
            wf: vec![weights.wf; n],
            rf: vec![weights.rf; n],
        });
        Self {
            wi: vec![weights.wi; n],
            wo: vec![weights.wo; n],
            wz: vec![weights.wz; n],
            ri: vec![weights.ri; n],
            ro: vec![weights.ro; n],
            rz: vec![weights.rz; n],
            final_y,
            final_c,
            forget,
        }
    }

    pub fn variant(&self) -> GateVariant {
        if self.forget.is_some() {
            GateVariant::ForgetGated
        } else {
            GateVariant::Plain
        }
    }

    /// Number of time steps covered
    pub fn window_size(&self) -> usize {
        self.wi.len()
    }

    /// 8 for the plain variant, 10 with a forget gate
    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }

    /// Every entry in canonical order
    pub fn entries(&self) -> Vec<&[f64]> {
        let mut entries = vec![
            self.wi.as_slice(),
            self.wo.as_slice(),
            self.wz.as_slice(),
            self.ri.as_slice(),
            self.ro.as_slice(),
            self.rz.as_slice(),
            self.final_y.as_slice(),
            self.final_c.as_slice(),
        ];
        if let Some(forget) = &self.forget {
            entries.push(forget.wf.as_slice());
            entries.push(forget.rf.as_slice());
        }
        entries
    }

    pub fn final_y(&self) -> &[f64] {
        &self.final_y
    }

    pub fn final_c(&self) -> &[f64] {
        &self.final_c
    }

    /// Check every entry spans the same number of steps
    pub fn validate(&self) -> Result<()> {
        let n = self.window_size();
        if n == 0 {
            return Err(RecurrentError::EmptySequence);
        }
        match self.entries().into_iter().find(|e| e.len() != n) {
            Some(entry) => Err(RecurrentError::Shape {
                context: "weight set entry".to_string(),
                expected: n,
                actual: entry.len(),
            }),
            None => Ok(()),
        }
    }

    /// Weights in effect at time step `step`. The plain variant reports a
    /// zero forget slot.
    pub fn weights_at(&self, step: usize) -> Result<GateWeights> {
        self.validate()?;
        if step >= self.window_size() {
            return Err(RecurrentError::Shape {
                context: "weight set step".to_string(),
                expected: self.window_size(),
                actual: step + 1,
            });
        }
        let (wf, rf) = match &self.forget {
            Some(forget) => (forget.wf[step], forget.rf[step]),
            None => (0.0, 0.0),
        };
        Ok(GateWeights {
            wi: self.wi[step],
            wo: self.wo[step],
            wz: self.wz[step],
            ri: self.ri[step],
            ro: self.ro[step],
            rz: self.rz[step],
            wf,
            rf,
        })
    }

    /// Hidden and cell state seeding the first step when training resumes
    pub fn resume_state(&self) -> (f64, f64) {
        (
            self.final_y.first().copied().unwrap_or_default(),
            self.final_c.first().copied().unwrap_or_default(),
        )
    }
}
