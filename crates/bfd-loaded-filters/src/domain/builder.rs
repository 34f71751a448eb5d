//! Filter build, merge and trim
//!
//! Pure functions: they read through the injected fetchers and return a new
//! filter collection. They never mutate a filter or an installed collection.
//! Output collections are ordered by descending `file_id`, newest file first.
//!
//! Any fetch error aborts the whole call; there is no partial result.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared_types::{FileId, LoadedBatch, LoadedFile, LoadedTuple};
use tracing::{debug, info, warn};

use super::bloom_filter::BloomFilter;
use super::file_filter::LoadedFileFilter;
use crate::error::StoreError;
use crate::ports::LoadedBatchStore;

/// The three store reads a filter build needs.
///
/// * `fetch_batches` - every batch currently known for a file
/// * `fetch_batch_count` - number of batches for a file
/// * `fetch_subject_estimate` - subjects in one batch of the file; batches
///   are assumed equally sized, so the filter is sized for
///   `batch_count * estimate`, capped at the subjects actually fetched
pub struct BatchFetchers<B, C, E> {
    pub fetch_batches: B,
    pub fetch_batch_count: C,
    pub fetch_subject_estimate: E,
}

impl<B, C, E> BatchFetchers<B, C, E>
where
    B: Fn(FileId) -> Result<Vec<LoadedBatch>, StoreError>,
    C: Fn(FileId) -> Result<u64, StoreError>,
    E: Fn(FileId) -> Result<u64, StoreError>,
{
    pub fn new(fetch_batches: B, fetch_batch_count: C, fetch_subject_estimate: E) -> Self {
        Self {
            fetch_batches,
            fetch_batch_count,
            fetch_subject_estimate,
        }
    }
}

/// Fetchers reading from a `LoadedBatchStore`.
pub fn store_fetchers<S>(
    store: &S,
) -> BatchFetchers<
    impl Fn(FileId) -> Result<Vec<LoadedBatch>, StoreError> + '_,
    impl Fn(FileId) -> Result<u64, StoreError> + '_,
    impl Fn(FileId) -> Result<u64, StoreError> + '_,
>
where
    S: LoadedBatchStore + ?Sized,
{
    BatchFetchers::new(
        move |file_id| store.fetch_file_batches(file_id),
        move |file_id| store.fetch_batch_count(file_id),
        move |file_id| store.fetch_estimated_subject_count(file_id),
    )
}

/// Build the filter for one loaded file.
///
/// Returns `Ok(None)` when the file has no batches: a file is not indexed
/// until at least one batch has been folded.
pub fn build_filter<B, C, E>(
    tuple: &LoadedTuple,
    fetchers: &BatchFetchers<B, C, E>,
    target_fpr: f64,
) -> Result<Option<LoadedFileFilter>, StoreError>
where
    B: Fn(FileId) -> Result<Vec<LoadedBatch>, StoreError>,
    C: Fn(FileId) -> Result<u64, StoreError>,
    E: Fn(FileId) -> Result<u64, StoreError>,
{
    let file_id = tuple.file_id;
    let batch_count = (fetchers.fetch_batch_count)(file_id)?;
    if batch_count == 0 {
        warn!(file_id, "Loaded tuple has no batches, skipping filter");
        return Ok(None);
    }

    let per_batch = (fetchers.fetch_subject_estimate)(file_id)?;
    let estimate = usize::try_from(batch_count.saturating_mul(per_batch)).unwrap_or(usize::MAX);

    let batches = (fetchers.fetch_batches)(file_id)?;
    if batches.is_empty() {
        warn!(file_id, batch_count, "Batch fetch returned nothing, skipping filter");
        return Ok(None);
    }

    // The store's estimate can only shrink the filter below the real count.
    let actual: usize = batches.iter().map(|b| b.subject_ids.len()).sum();
    let expected_subjects = estimate.min(actual).max(1);

    let mut bloom = BloomFilter::with_capacity(expected_subjects, target_fpr);
    let mut first_updated = tuple.first_updated;
    let mut last_updated = tuple.last_updated;
    for batch in &batches {
        for subject_id in &batch.subject_ids {
            bloom.add(subject_id);
        }
        // Widen, never narrow: the interval must cover every folded batch.
        first_updated = first_updated.min(batch.created);
        last_updated = last_updated.max(batch.created);
    }

    info!(
        file_id,
        batches = batches.len(),
        size_bits = bloom.size_bits(),
        bits_set = bloom.bits_set(),
        "Built loaded file filter"
    );

    Ok(Some(LoadedFileFilter::new(
        file_id,
        batches.len(),
        first_updated,
        last_updated,
        bloom,
    )))
}

/// Build fresh filters for every tuple, independent of prior state.
pub fn build_new_filters<B, C, E>(
    tuples: &[LoadedTuple],
    fetchers: &BatchFetchers<B, C, E>,
    target_fpr: f64,
) -> Result<Vec<Arc<LoadedFileFilter>>, StoreError>
where
    B: Fn(FileId) -> Result<Vec<LoadedBatch>, StoreError>,
    C: Fn(FileId) -> Result<u64, StoreError>,
    E: Fn(FileId) -> Result<u64, StoreError>,
{
    let mut seen = HashSet::with_capacity(tuples.len());
    let mut filters = Vec::with_capacity(tuples.len());
    for tuple in tuples {
        if !seen.insert(tuple.file_id) {
            continue;
        }
        if let Some(filter) = build_filter(tuple, fetchers, target_fpr)? {
            filters.push(Arc::new(filter));
        }
    }
    sort_newest_first(&mut filters);
    Ok(filters)
}

/// Merge new tuples into an existing filter collection.
///
/// Per tuple:
/// - no previous filter: build one
/// - previous filter with the same `last_updated`: reuse the same `Arc`
/// - otherwise: rebuild the file's filter from all of its batches
///
/// Previous filters whose file has no tuple are carried forward unchanged.
/// Only trimming removes filters.
pub fn build_merged_filters<B, C, E>(
    previous: &[Arc<LoadedFileFilter>],
    tuples: &[LoadedTuple],
    fetchers: &BatchFetchers<B, C, E>,
    target_fpr: f64,
) -> Result<Vec<Arc<LoadedFileFilter>>, StoreError>
where
    B: Fn(FileId) -> Result<Vec<LoadedBatch>, StoreError>,
    C: Fn(FileId) -> Result<u64, StoreError>,
    E: Fn(FileId) -> Result<u64, StoreError>,
{
    let mut existing: HashMap<FileId, &Arc<LoadedFileFilter>> =
        previous.iter().map(|f| (f.file_id(), f)).collect();
    let mut seen = HashSet::with_capacity(tuples.len());
    let mut merged = Vec::with_capacity(previous.len() + tuples.len());

    for tuple in tuples {
        if !seen.insert(tuple.file_id) {
            continue;
        }
        match existing.remove(&tuple.file_id) {
            Some(current) if current.last_updated() == tuple.last_updated => {
                debug!(file_id = tuple.file_id, "Reusing unchanged loaded file filter");
                merged.push(Arc::clone(current));
            }
            Some(current) => match build_filter(tuple, fetchers, target_fpr)? {
                Some(rebuilt) => merged.push(Arc::new(rebuilt)),
                None => merged.push(Arc::clone(current)),
            },
            None => {
                if let Some(built) = build_filter(tuple, fetchers, target_fpr)? {
                    merged.push(Arc::new(built));
                }
            }
        }
    }

    merged.extend(existing.into_values().cloned());
    sort_newest_first(&mut merged);
    Ok(merged)
}

/// Drop filters whose file is no longer in `remaining_files`.
///
/// Surviving filters are the same `Arc`s, in the same order.
pub fn build_trimmed_filters(
    filters: &[Arc<LoadedFileFilter>],
    remaining_files: &[LoadedFile],
) -> Vec<Arc<LoadedFileFilter>> {
    let remaining: HashSet<FileId> = remaining_files.iter().map(|f| f.file_id).collect();
    filters
        .iter()
        .filter(|f| remaining.contains(&f.file_id()))
        .cloned()
        .collect()
}

fn sort_newest_first(filters: &mut [Arc<LoadedFileFilter>]) {
    filters.sort_by(|a, b| b.file_id().cmp(&a.file_id()));
}
