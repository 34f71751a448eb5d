//! Outbound Ports (Driven Ports)
//!
//! Reads the index needs from the load-tracking tables. This trait is the
//! only I/O boundary of the crate; build, merge, trim and the query
//! predicates never touch the store directly.

use shared_types::{FileId, LoadedBatch, LoadedFile, LoadedTuple, Timestamp};

use crate::error::StoreError;

/// Load-tracking store (Driven Port)
///
/// Implementations may block; the refresh driver calls them off the async
/// executor.
pub trait LoadedBatchStore: Send + Sync {
    /// Every batch currently known for a file.
    fn fetch_file_batches(&self, file_id: FileId) -> Result<Vec<LoadedBatch>, StoreError>;

    /// Number of batches currently known for a file.
    fn fetch_batch_count(&self, file_id: FileId) -> Result<u64, StoreError>;

    /// Subjects in one batch of the file, used to size its filter.
    fn fetch_estimated_subject_count(&self, file_id: FileId) -> Result<u64, StoreError>;

    /// One tuple per file with at least one batch, newest file first.
    fn fetch_all_filter_tuples(&self) -> Result<Vec<LoadedTuple>, StoreError>;

    /// Every file still present in the store.
    fn fetch_all_files(&self) -> Result<Vec<LoadedFile>, StoreError>;

    /// `min(batch.created)`, or `None` when there are no batches.
    fn fetch_first_batch_created(&self) -> Result<Option<Timestamp>, StoreError>;

    /// `max(batch.created)`, or `None` when there are no batches.
    fn fetch_last_batch_created(&self) -> Result<Option<Timestamp>, StoreError>;
}
