//! Contract module containing trait definitions for state persistence

mod state_store;

pub use state_store::StateStore;
