//! Adapters Layer
//!
//! Implementations of the driven ports.

pub mod in_memory_store;

pub use in_memory_store::InMemoryBatchStore;
