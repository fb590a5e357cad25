//! In-process snapshots

use forecast_spi::{ForecastError, ModelState, Result, StateStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// Keeps states in memory; used by tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, ModelState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> ForecastError {
    ForecastError::Persistence("state store lock poisoned".to_string())
}

impl StateStore for MemoryStateStore {
    fn load(&self, name: &str) -> Result<ModelState> {
        self.states
            .lock()
            .map_err(poisoned)?
            .get(name)
            .cloned()
            .ok_or_else(|| ForecastError::Persistence(format!("no state named '{}'", name)))
    }

    fn save(&self, state: &ModelState) -> Result<()> {
        self.states
            .lock()
            .map_err(poisoned)?
            .insert(state.name.clone(), state.clone());
        Ok(())
    }
}
