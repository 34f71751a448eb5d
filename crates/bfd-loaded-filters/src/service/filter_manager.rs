//! Filter Manager
//!
//! Holds the installed filter collection and answers the read path's
//! freshness questions.
//!
//! Readers `load()` an immutable [`FilterSnapshot`] through an `ArcSwap` and
//! never block. Writers (refresh, trim, install) build a complete new
//! snapshot and publish it with one `store`, serialised by a writer mutex
//! that readers never touch.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared_types::{DateRange, Timestamp};
use tracing::{debug, info, warn};

use crate::config::FilterConfig;
use crate::domain::{build_merged_filters, build_trimmed_filters, store_fetchers, LoadedFileFilter};
use crate::error::FilterError;
use crate::metrics::{FilterMetrics, MetricsSnapshot};
use crate::ports::{FreshnessIndex, LoadedBatchStore};

/// Seconds since the epoch of 2020-01-01T00:00:00Z, a date before any batch
/// carried a `_lastUpdated` timestamp.
pub const BEFORE_LAST_UPDATED_FEATURE_SECS: i64 = 1_577_836_800;

/// 2020-01-01T00:00:00Z. Reported as the transaction time until the store
/// has a batch.
pub fn before_last_updated_feature() -> Timestamp {
    DateTime::from_timestamp(BEFORE_LAST_UPDATED_FEATURE_SECS, 0).unwrap_or_default()
}

/// One installed state of the index. Never mutated after publication.
#[derive(Debug)]
pub struct FilterSnapshot {
    filters: Vec<Arc<LoadedFileFilter>>,
    /// `(min first_updated, max last_updated)` over `filters`
    bounds: Option<(Timestamp, Timestamp)>,
    /// Store's `min(batch.created)` as of the refresh that produced this state
    first_batch_created: Option<Timestamp>,
    /// Store's `max(batch.created)` as of the refresh that produced this state
    last_batch_created: Option<Timestamp>,
    /// Instant captured before the store was read
    refreshed_at: Option<Timestamp>,
    transaction_time: Timestamp,
}

impl FilterSnapshot {
    fn empty(transaction_time: Timestamp) -> Self {
        Self {
            filters: Vec::new(),
            bounds: None,
            first_batch_created: None,
            last_batch_created: None,
            refreshed_at: None,
            transaction_time,
        }
    }

    fn new(
        filters: Vec<Arc<LoadedFileFilter>>,
        first_batch_created: Option<Timestamp>,
        last_batch_created: Option<Timestamp>,
        refreshed_at: Option<Timestamp>,
        transaction_time: Timestamp,
    ) -> Self {
        let bounds = filters.iter().fold(None, |acc, f| match acc {
            None => Some((f.first_updated(), f.last_updated())),
            Some((lower, upper)) => Some((
                lower.min(f.first_updated()),
                upper.max(f.last_updated()),
            )),
        });
        Self {
            filters,
            bounds,
            first_batch_created,
            last_batch_created,
            refreshed_at,
            transaction_time,
        }
    }

    /// Installed filters, newest file first.
    pub fn filters(&self) -> &[Arc<LoadedFileFilter>] {
        &self.filters
    }

    /// Earliest `first_updated` of any installed filter.
    pub fn lower_bound(&self) -> Option<Timestamp> {
        self.bounds.map(|(lower, _)| lower)
    }

    /// Latest `last_updated` of any installed filter.
    pub fn upper_bound(&self) -> Option<Timestamp> {
        self.bounds.map(|(_, upper)| upper)
    }

    /// Store's oldest batch as of the refresh that produced this state.
    pub fn first_batch_created(&self) -> Option<Timestamp> {
        self.first_batch_created
    }

    /// Store's newest batch as of the refresh that produced this state.
    pub fn last_batch_created(&self) -> Option<Timestamp> {
        self.last_batch_created
    }

    /// Watermark of the refresh that produced this state.
    pub fn refreshed_at(&self) -> Option<Timestamp> {
        self.refreshed_at
    }

    /// Newest batch the index has seen.
    pub fn transaction_time(&self) -> Timestamp {
        self.transaction_time
    }

    fn is_in_bounds(&self, range: &DateRange) -> bool {
        match self.bounds {
            Some((lower, upper)) => range.intersects(lower, upper),
            None => false,
        }
    }

    fn is_result_set_empty(&self, subject_id: &str, range: &DateRange) -> bool {
        if self.filters.is_empty() || subject_id.is_empty() {
            return false;
        }
        // No opinion about time the index has not looked at yet.
        match self.refreshed_at {
            Some(watermark) if range.ends_by(watermark) => {}
            _ => return false,
        }
        !self
            .filters
            .iter()
            .any(|f| f.matches_date_range(range) && f.might_contain(subject_id))
    }
}

/// What one call to [`FilterManager::refresh`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// The store's newest batch moved, so the filters were merged
    pub merged: bool,
    /// The store's oldest batch moved, so the filters were trimmed
    pub trimmed: bool,
    pub filters_built: usize,
    pub filters_reused: usize,
    pub filters_removed: usize,
    /// Filters installed after the refresh
    pub filter_count: usize,
}

/// Loaded filter manager
///
/// Implements the `FreshnessIndex` port. Has no timer of its own; a
/// [`RefreshTask`](super::RefreshTask) or other driver calls [`refresh`].
///
/// [`refresh`]: FilterManager::refresh
pub struct FilterManager {
    state: ArcSwap<FilterSnapshot>,
    writer: Mutex<()>,
    false_positive_rate: f64,
    metrics: FilterMetrics,
}

impl FilterManager {
    /// Create an empty manager. Both predicates answer `false` until the
    /// first successful refresh.
    pub fn new(config: &FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self::with_fpr(config.false_positive_rate))
    }

    fn with_fpr(false_positive_rate: f64) -> Self {
        Self {
            state: ArcSwap::from_pointee(FilterSnapshot::empty(before_last_updated_feature())),
            writer: Mutex::new(()),
            false_positive_rate,
            metrics: FilterMetrics::new(),
        }
    }

    /// Seed the transaction time from the store's newest batch.
    ///
    /// Falls back to [`before_last_updated_feature`] when the store has no
    /// batches or cannot be read; the next refresh corrects it.
    pub fn init<S>(&self, store: &S) -> Timestamp
    where
        S: LoadedBatchStore + ?Sized,
    {
        let _guard = self.writer.lock();
        let transaction_time = match store.fetch_last_batch_created() {
            Ok(last) => last.unwrap_or_else(before_last_updated_feature),
            Err(e) => {
                warn!(error = %e, "Unable to read transaction time on init, refresh will set it");
                before_last_updated_feature()
            }
        };

        let current = self.state.load();
        self.state.store(Arc::new(FilterSnapshot::new(
            current.filters.clone(),
            current.first_batch_created,
            current.last_batch_created,
            current.refreshed_at,
            transaction_time,
        )));
        info!(%transaction_time, "Initialized loaded filter manager");
        transaction_time
    }

    /// Does `range` overlap the interval covered by the installed filters?
    pub fn is_in_bounds(&self, range: &DateRange) -> bool {
        self.state.load().is_in_bounds(range)
    }

    /// Is a search for `subject_id` updated within `range` certain to be
    /// empty?
    ///
    /// `false` when nothing is installed, when `subject_id` is empty, or when
    /// any part of `range` lies after the last refresh (an open upper end
    /// always does). Otherwise `true` iff no filter whose interval intersects
    /// `range` might contain the subject; a range that misses every interval
    /// is therefore empty.
    pub fn is_result_set_empty(&self, subject_id: &str, range: &DateRange) -> bool {
        let empty = self.state.load().is_result_set_empty(subject_id, range);
        self.metrics.record_emptiness_query(empty);
        empty
    }

    /// Replace the installed filters.
    ///
    /// The store watermarks are cleared, so the next [`refresh`] merges and
    /// trims unconditionally.
    ///
    /// [`refresh`]: FilterManager::refresh
    pub fn install(&self, filters: Vec<Arc<LoadedFileFilter>>, refreshed_at: Timestamp) {
        let _guard = self.writer.lock();
        let current = self.state.load();
        let upper = filters.iter().map(|f| f.last_updated()).max();
        let transaction_time = upper.map_or(current.transaction_time, |u| {
            u.max(current.transaction_time)
        });
        let snapshot = FilterSnapshot::new(filters, None, None, Some(refreshed_at), transaction_time);
        info!(
            filters = snapshot.filters.len(),
            %refreshed_at,
            "Installed loaded file filters"
        );
        self.state.store(Arc::new(snapshot));
    }

    /// Refresh against the store, stamping the result with the current time.
    pub fn refresh<S>(&self, store: &S) -> Result<RefreshOutcome, FilterError>
    where
        S: LoadedBatchStore + ?Sized,
    {
        self.refresh_as_of(store, Utc::now())
    }

    /// Refresh against the store, stamping the result with `watermark`.
    ///
    /// `watermark` must not be later than the instant the store is read.
    /// On error nothing is installed.
    pub fn refresh_as_of<S>(
        &self,
        store: &S,
        watermark: Timestamp,
    ) -> Result<RefreshOutcome, FilterError>
    where
        S: LoadedBatchStore + ?Sized,
    {
        let _guard = self.writer.lock();
        match self.try_refresh(store, watermark) {
            Ok(outcome) => {
                self.metrics
                    .record_refresh(outcome.filters_built, outcome.filters_reused);
                if outcome.trimmed {
                    self.metrics.record_trim(outcome.filters_removed);
                }
                Ok(outcome)
            }
            Err(e) => {
                self.metrics.record_refresh_failure();
                Err(e)
            }
        }
    }

    fn try_refresh<S>(&self, store: &S, watermark: Timestamp) -> Result<RefreshOutcome, FilterError>
    where
        S: LoadedBatchStore + ?Sized,
    {
        let current = self.state.load_full();
        let last_batch_created = store.fetch_last_batch_created()?;
        let first_batch_created = store.fetch_first_batch_created()?;
        let mut outcome = RefreshOutcome::default();

        let mut filters = if last_batch_created != current.last_batch_created {
            info!(
                from = ?current.last_batch_created,
                to = ?last_batch_created,
                "Refreshing loaded file filters"
            );
            let tuples = store.fetch_all_filter_tuples()?;
            let merged = build_merged_filters(
                &current.filters,
                &tuples,
                &store_fetchers(store),
                self.false_positive_rate,
            )?;
            outcome.merged = true;
            outcome.filters_reused = merged
                .iter()
                .filter(|f| current.filters.iter().any(|p| Arc::ptr_eq(p, f)))
                .count();
            outcome.filters_built = merged.len() - outcome.filters_reused;
            merged
        } else {
            debug!("No new batches since last refresh");
            outcome.filters_reused = current.filters.len();
            current.filters.clone()
        };

        if first_batch_created != current.first_batch_created {
            let files = store.fetch_all_files()?;
            let before = filters.len();
            filters = build_trimmed_filters(&filters, &files);
            outcome.trimmed = true;
            outcome.filters_removed = before - filters.len();
            info!(
                first_batch_created = ?first_batch_created,
                removed = outcome.filters_removed,
                "Trimmed loaded file filters"
            );
        }

        let refreshed_at = current
            .refreshed_at
            .map_or(watermark, |prev| prev.max(watermark));
        let transaction_time = last_batch_created.map_or(current.transaction_time, |last| {
            last.max(current.transaction_time)
        });
        outcome.filter_count = filters.len();

        self.state.store(Arc::new(FilterSnapshot::new(
            filters,
            first_batch_created,
            last_batch_created,
            Some(refreshed_at),
            transaction_time,
        )));
        Ok(outcome)
    }

    /// Drop filters whose file has been evicted from the store.
    ///
    /// Returns the number of filters removed.
    pub fn trim<S>(&self, store: &S) -> Result<usize, FilterError>
    where
        S: LoadedBatchStore + ?Sized,
    {
        let _guard = self.writer.lock();
        let current = self.state.load_full();
        let files = store.fetch_all_files()?;
        let first_batch_created = store.fetch_first_batch_created()?;

        let filters = build_trimmed_filters(&current.filters, &files);
        let removed = current.filters.len() - filters.len();
        self.state.store(Arc::new(FilterSnapshot::new(
            filters,
            first_batch_created,
            current.last_batch_created,
            current.refreshed_at,
            current.transaction_time,
        )));
        self.metrics.record_trim(removed);
        info!(removed, "Trimmed loaded file filters");
        Ok(removed)
    }

    /// The last instant the index knows the store was written.
    pub fn transaction_time(&self) -> Timestamp {
        self.state.load().transaction_time
    }

    /// Store's oldest batch at the last refresh; `None` after `install`.
    pub fn first_batch_created(&self) -> Option<Timestamp> {
        self.state.load().first_batch_created
    }

    /// Store's newest batch at the last refresh; `None` after `install`.
    pub fn last_batch_created(&self) -> Option<Timestamp> {
        self.state.load().last_batch_created
    }

    /// Instant up to which the installed filters are known to be complete.
    pub fn refreshed_at(&self) -> Option<Timestamp> {
        self.state.load().refreshed_at
    }

    /// Installed filters, newest file first.
    pub fn filters(&self) -> Vec<Arc<LoadedFileFilter>> {
        self.state.load().filters.clone()
    }

    /// The currently installed state.
    pub fn snapshot(&self) -> Arc<FilterSnapshot> {
        self.state.load_full()
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for FilterManager {
    fn default() -> Self {
        Self::with_fpr(FilterConfig::default().false_positive_rate)
    }
}

impl FreshnessIndex for FilterManager {
    fn is_in_bounds(&self, range: &DateRange) -> bool {
        FilterManager::is_in_bounds(self, range)
    }

    fn is_result_set_empty(&self, subject_id: &str, range: &DateRange) -> bool {
        FilterManager::is_result_set_empty(self, subject_id, range)
    }

    fn transaction_time(&self) -> Timestamp {
        FilterManager::transaction_time(self)
    }
}

struct OptTs(Option<Timestamp>);

impl fmt::Display for OptTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ts) => write!(f, "{}", ts.to_rfc3339()),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Display for FilterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        write!(
            f,
            "FilterManager [filters={}, transaction_time={}, first_batch_created={}, last_batch_created={}, refreshed_at={}]",
            state.filters.len(),
            state.transaction_time.to_rfc3339(),
            OptTs(state.first_batch_created),
            OptTs(state.last_batch_created),
            OptTs(state.refreshed_at),
        )
    }
}
