//! Unit variant

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a unit computes a forget gate or passes its cell state through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVariant {
    /// Forget activation fixed at 1
    Plain,
    /// Forget activation computed from `Wf`, `Rf`
    #[default]
    ForgetGated,
}

impl GateVariant {
    pub fn has_forget_gate(&self) -> bool {
        matches!(self, GateVariant::ForgetGated)
    }

    /// Entries in a [`crate::WeightSet`] of this variant
    pub fn entry_count(&self) -> usize {
        if self.has_forget_gate() {
            10
        } else {
            8
        }
    }
}

impl fmt::Display for GateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateVariant::Plain => write!(f, "plain"),
            GateVariant::ForgetGated => write!(f, "forget-gated"),
        }
    }
}
