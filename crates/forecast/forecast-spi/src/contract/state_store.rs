//! State store trait definition

use crate::error::Result;
use crate::model::{HyperParameters, ModelState};
use tracing::warn;

/// Loads and saves [`ModelState`] snapshots addressed by model name
pub trait StateStore: Send + Sync {
    /// Read the snapshot stored under `name`
    fn load(&self, name: &str) -> Result<ModelState>;

    /// Write `state` under its own name, replacing any previous snapshot
    fn save(&self, state: &ModelState) -> Result<()>;

    /// Read the snapshot, or start fresh from `hyper` when it is absent or
    /// unreadable
    fn load_or_default(&self, name: &str, hyper: HyperParameters) -> ModelState {
        match self.load(name) {
            Ok(state) => state,
            Err(e) => {
                warn!(model = name, error = %e, "no usable saved state, starting fresh");
                ModelState::new(name, hyper)
            }
        }
    }
}
