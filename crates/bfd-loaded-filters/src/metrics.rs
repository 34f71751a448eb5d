//! Metrics hooks for the loaded filter index
//!
//! Counters for refresh activity and query short-circuiting. A high
//! `short_circuited_queries / emptiness_queries` ratio is the point of the
//! whole index; a rising `refresh_failures` means the filters are going stale.
//!
//! ## Usage
//!
//! ```ignore
//! use bfd_loaded_filters::metrics::FilterMetrics;
//!
//! let metrics = FilterMetrics::new();
//! metrics.record_emptiness_query(true);
//! assert_eq!(metrics.snapshot().short_circuited_queries, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the loaded filter index
///
/// Thread-safe counters, read lock-free by the query path.
#[derive(Default)]
pub struct FilterMetrics {
    /// Successful refreshes installed
    pub refreshes: AtomicU64,
    /// Refreshes that failed and left the index untouched
    pub refresh_failures: AtomicU64,
    /// Trims installed
    pub trims: AtomicU64,
    /// File filters built or rebuilt
    pub filters_built: AtomicU64,
    /// File filters carried over by identity
    pub filters_reused: AtomicU64,
    /// File filters dropped by trimming
    pub filters_trimmed: AtomicU64,
    /// `is_result_set_empty` calls
    pub emptiness_queries: AtomicU64,
    /// `is_result_set_empty` calls answered `true`
    pub short_circuited_queries: AtomicU64,
}

impl FilterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed refresh
    ///
    /// # Arguments
    /// * `built` - filters built or rebuilt by this refresh
    /// * `reused` - filters carried over unchanged
    pub fn record_refresh(&self, built: usize, reused: usize) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        self.filters_built.fetch_add(built as u64, Ordering::Relaxed);
        self.filters_reused.fetch_add(reused as u64, Ordering::Relaxed);
    }

    pub fn record_refresh_failure(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an installed trim that dropped `removed` filters
    pub fn record_trim(&self, removed: usize) {
        self.trims.fetch_add(1, Ordering::Relaxed);
        self.filters_trimmed.fetch_add(removed as u64, Ordering::Relaxed);
    }

    /// Record an emptiness query and whether it short-circuited
    pub fn record_emptiness_query(&self, empty: bool) {
        self.emptiness_queries.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.short_circuited_queries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            trims: self.trims.load(Ordering::Relaxed),
            filters_built: self.filters_built.load(Ordering::Relaxed),
            filters_reused: self.filters_reused.load(Ordering::Relaxed),
            filters_trimmed: self.filters_trimmed.load(Ordering::Relaxed),
            emptiness_queries: self.emptiness_queries.load(Ordering::Relaxed),
            short_circuited_queries: self.short_circuited_queries.load(Ordering::Relaxed),
        }
    }

}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub trims: u64,
    pub filters_built: u64,
    pub filters_reused: u64,
    pub filters_trimmed: u64,
    pub emptiness_queries: u64,
    pub short_circuited_queries: u64,
}
