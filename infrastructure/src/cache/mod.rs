//! Result cache adapters

mod file;
mod memory;

pub use file::FileResultCache;
pub use memory::InMemoryResultCache;
