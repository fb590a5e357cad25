//! Payload rank

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical rank of a pipeline payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// Flat 1-D series
    Series,
    /// 2-D rows, one per bucket or horizon offset
    Grouped,
    /// 3-D windows paired with targets
    Windowed,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Series => write!(f, "1-D series"),
            Rank::Grouped => write!(f, "2-D grouped"),
            Rank::Windowed => write!(f, "3-D windowed"),
        }
    }
}
