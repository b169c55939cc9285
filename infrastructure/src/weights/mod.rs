//! Weight store adapters
//!
//! - [`InMemoryWeightStore`]: lock-free per-agent compare-and-swap cells
//! - [`FileWeightStore`]: JSON file shared across processes under a file lock

mod file;
mod memory;

pub use file::FileWeightStore;
pub use memory::InMemoryWeightStore;
