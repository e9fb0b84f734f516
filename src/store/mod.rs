//! Asset store implementations.

pub mod memory;

pub use memory::MemoryAssetStore;
