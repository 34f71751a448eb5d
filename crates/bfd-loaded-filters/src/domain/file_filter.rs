//! Per-file filter
//!
//! One Bloom filter folded from every batch of one loaded file, plus the
//! interval over which the file's batches were committed.

use shared_types::{DateRange, FileId, Timestamp};

use super::bloom_filter::BloomFilter;

/// Filter for one loaded file
///
/// `first_updated` is the file's `created` instant, which may predate its
/// first batch. `last_updated` is the newest batch `created` instant. The
/// interval is never narrowed, so a subject changed by any folded batch is
/// always found by a query whose window touches the interval.
#[derive(Debug)]
pub struct LoadedFileFilter {
    file_id: FileId,
    batches_count: usize,
    first_updated: Timestamp,
    last_updated: Timestamp,
    filter: BloomFilter,
}

impl LoadedFileFilter {
    pub fn new(
        file_id: FileId,
        batches_count: usize,
        first_updated: Timestamp,
        last_updated: Timestamp,
        filter: BloomFilter,
    ) -> Self {
        Self {
            file_id,
            batches_count,
            first_updated,
            last_updated,
            filter,
        }
    }

    /// Could records of this file have been updated inside `range`?
    pub fn matches_date_range(&self, range: &DateRange) -> bool {
        range.intersects(self.first_updated, self.last_updated)
    }

    /// Might `subject_id` appear in one of this file's batches?
    pub fn might_contain(&self, subject_id: &str) -> bool {
        self.filter.might_contain(subject_id)
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn batches_count(&self) -> usize {
        self.batches_count
    }

    pub fn first_updated(&self) -> Timestamp {
        self.first_updated
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }
}
