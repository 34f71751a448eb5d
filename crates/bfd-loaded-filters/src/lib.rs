//! # BFD Loaded Filters
//!
//! Freshness index for `_lastUpdated` searches: one Bloom filter per loaded
//! file, answering "could subject S have changed inside [a, b]?" without
//! touching the store.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - `BloomFilter`: Core probabilistic data structure
//!   - `LoadedFileFilter`: Filter and update interval of one loaded file
//!   - `build_new_filters` / `build_merged_filters` / `build_trimmed_filters`
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `FreshnessIndex`: Driving port (read path queries)
//!   - `LoadedBatchStore`: Driven port (load-tracking tables)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `FilterManager`: Implements `FreshnessIndex`, owns the installed snapshot
//!   - `RefreshTask`: Periodic refresh on tokio
//!
//! - **Adapters Layer** (`adapters/`): Store implementations
//!   - `InMemoryBatchStore`
//!
//! ## Invariants
//!
//! - **No false negatives**: `is_result_set_empty` never returns `true` for a
//!   subject present in a folded batch whose interval meets the range
//! - Filter intervals are only ever widened
//! - Readers see either the old or the new snapshot, never a mix
//!
//! ## Usage Example
//!
//! ```ignore
//! use bfd_loaded_filters::{FilterConfig, FilterManager, InMemoryBatchStore, RefreshTask};
//! use shared_types::DateRange;
//! use std::sync::Arc;
//!
//! let config = FilterConfig::from_env();
//! let manager = Arc::new(FilterManager::new(&config)?);
//! let store = Arc::new(InMemoryBatchStore::new());
//! manager.init(store.as_ref());
//!
//! let task = RefreshTask::spawn(Arc::clone(&manager), store, &config);
//!
//! if manager.is_result_set_empty("567834", &DateRange::between(since, until)) {
//!     // skip the query
//! }
//!
//! task.shutdown().await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::InMemoryBatchStore;
pub use config::{FilterConfig, FilterConfigBuilder};
pub use domain::{
    build_filter, build_merged_filters, build_new_filters, build_trimmed_filters, BatchFetchers,
    BloomFilter, LoadedFileFilter,
};
pub use error::{FilterError, StoreError};
pub use metrics::{FilterMetrics, MetricsSnapshot};
pub use ports::{FreshnessIndex, LoadedBatchStore};
pub use service::{before_last_updated_feature, FilterManager, FilterSnapshot, RefreshOutcome, RefreshTask};
