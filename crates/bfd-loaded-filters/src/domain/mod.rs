//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Core Bloom filter implementation
//! - Hash functions
//! - Parameter calculations
//! - Per-file filters
//! - Filter build, merge and trim
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod bloom_filter;
pub mod builder;
pub mod file_filter;
pub mod hash_functions;
pub mod parameters;

pub use bloom_filter::BloomFilter;
pub use builder::{
    build_filter, build_merged_filters, build_new_filters, build_trimmed_filters, store_fetchers,
    BatchFetchers,
};
pub use file_filter::LoadedFileFilter;
pub use parameters::{size_for, FilterSizing};
