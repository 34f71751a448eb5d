//! In-memory load-tracking store
//!
//! Holds files and batches the way the pipeline's tables do. Used by tests,
//! benchmarks and embedders that mirror the tables themselves.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use shared_types::{FileId, LoadedBatch, LoadedFile, LoadedTuple, Timestamp};
use tracing::debug;

use crate::error::StoreError;
use crate::ports::LoadedBatchStore;

#[derive(Default)]
struct Tables {
    files: BTreeMap<FileId, LoadedFile>,
    batches: Vec<LoadedBatch>,
}

impl Tables {
    fn batches_of(&self, file_id: FileId) -> impl Iterator<Item = &LoadedBatch> {
        self.batches.iter().filter(move |b| b.file_id == file_id)
    }
}

/// `LoadedBatchStore` backed by process memory.
#[derive(Default)]
pub struct InMemoryBatchStore {
    tables: RwLock<Tables>,
    fail_next: AtomicBool,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file. Replaces any file with the same id.
    pub fn insert_file(&self, file: LoadedFile) {
        self.tables.write().files.insert(file.file_id, file);
    }

    /// Commit a batch.
    pub fn insert_batch(&self, batch: LoadedBatch) {
        self.tables.write().batches.push(batch);
    }

    /// Evict a file and all of its batches.
    ///
    /// Returns `false` when the file was not present.
    pub fn remove_file(&self, file_id: FileId) -> bool {
        let mut tables = self.tables.write();
        tables.batches.retain(|b| b.file_id != file_id);
        let removed = tables.files.remove(&file_id).is_some();
        debug!(file_id, removed, "Evicted loaded file");
        removed
    }

    /// Make the next fetch of any kind fail with a connection error.
    pub fn fail_next_fetch(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn file_count(&self) -> usize {
        self.tables.read().files.len()
    }

    pub fn batch_count(&self) -> usize {
        self.tables.read().batches.len()
    }

    fn check_fault(&self) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::ConnectionError(
                "injected fetch failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl LoadedBatchStore for InMemoryBatchStore {
    fn fetch_file_batches(&self, file_id: FileId) -> Result<Vec<LoadedBatch>, StoreError> {
        self.check_fault()?;
        Ok(self.tables.read().batches_of(file_id).cloned().collect())
    }

    fn fetch_batch_count(&self, file_id: FileId) -> Result<u64, StoreError> {
        self.check_fault()?;
        Ok(self.tables.read().batches_of(file_id).count() as u64)
    }

    fn fetch_estimated_subject_count(&self, file_id: FileId) -> Result<u64, StoreError> {
        self.check_fault()?;
        Ok(self
            .tables
            .read()
            .batches_of(file_id)
            .next()
            .map(|b| b.subject_count() as u64)
            .unwrap_or(0))
    }

    fn fetch_all_filter_tuples(&self) -> Result<Vec<LoadedTuple>, StoreError> {
        self.check_fault()?;
        let tables = self.tables.read();
        Ok(tables
            .files
            .values()
            .rev()
            .filter_map(|file| {
                tables
                    .batches_of(file.file_id)
                    .map(|b| b.created)
                    .max()
                    .map(|last| LoadedTuple::new(file.file_id, file.created, last))
            })
            .collect())
    }

    fn fetch_all_files(&self) -> Result<Vec<LoadedFile>, StoreError> {
        self.check_fault()?;
        Ok(self.tables.read().files.values().cloned().collect())
    }

    fn fetch_first_batch_created(&self) -> Result<Option<Timestamp>, StoreError> {
        self.check_fault()?;
        Ok(self.tables.read().batches.iter().map(|b| b.created).min())
    }

    fn fetch_last_batch_created(&self) -> Result<Option<Timestamp>, StoreError> {
        self.check_fault()?;
        Ok(self.tables.read().batches.iter().map(|b| b.created).max())
    }
}
