//! State store implementations

mod file;
mod memory;
mod snapshot;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;
pub use snapshot::{decode_snapshot, encode_snapshot};
