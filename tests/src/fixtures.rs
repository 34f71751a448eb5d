//! Pipeline simulator
//!
//! Plays the role of the ETL pipeline: registers files, commits batches on a
//! monotonically advancing clock and evicts old files. Keeps its own record
//! of every batch so tests can compare the index against ground truth.

use std::sync::Arc;

use bfd_loaded_filters::InMemoryBatchStore;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use shared_types::{DateRange, FileId, LoadedBatch, LoadedFile, Timestamp};

/// Start of simulated time.
pub fn epoch() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[derive(Default)]
struct Clock {
    ticks: i64,
    next_file_id: FileId,
    next_batch_id: i64,
    committed: Vec<LoadedBatch>,
}

/// Writes files and batches the way the pipeline does.
pub struct PipelineSimulator {
    store: Arc<InMemoryBatchStore>,
    state: Mutex<Clock>,
}

impl Default for PipelineSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineSimulator {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryBatchStore::new()),
            state: Mutex::new(Clock::default()),
        }
    }

    pub fn store(&self) -> Arc<InMemoryBatchStore> {
        Arc::clone(&self.store)
    }

    /// Current simulated instant.
    pub fn now(&self) -> Timestamp {
        epoch() + Duration::seconds(self.state.lock().ticks)
    }

    /// Advance the clock and return the new instant.
    pub fn tick(&self, seconds: i64) -> Timestamp {
        let mut state = self.state.lock();
        state.ticks += seconds;
        epoch() + Duration::seconds(state.ticks)
    }

    /// Register a new file at the current instant.
    pub fn start_file(&self, kind: &str) -> FileId {
        let created = self.tick(1);
        let file_id = {
            let mut state = self.state.lock();
            state.next_file_id += 1;
            state.next_file_id
        };
        self.store.insert_file(LoadedFile::new(file_id, kind, created));
        file_id
    }

    /// Commit a batch for `file_id` one second from now.
    pub fn commit_batch<S: AsRef<str>>(&self, file_id: FileId, subjects: &[S]) -> Timestamp {
        let created = self.tick(1);
        let batch = {
            let mut state = self.state.lock();
            state.next_batch_id += 1;
            let batch = LoadedBatch::new(
                state.next_batch_id,
                file_id,
                subjects.iter().map(|s| s.as_ref().to_string()).collect(),
                created,
            );
            state.committed.push(batch.clone());
            batch
        };
        self.store.insert_batch(batch);
        created
    }

    /// Evict a file and its batches from the store.
    pub fn evict_file(&self, file_id: FileId) {
        self.store.remove_file(file_id);
        self.state.lock().committed.retain(|b| b.file_id != file_id);
    }

    /// Did any committed batch touch `subject` inside `range`?
    pub fn touched(&self, subject: &str, range: &DateRange) -> bool {
        self.state
            .lock()
            .committed
            .iter()
            .any(|b| range.contains_instant(&b.created) && b.subject_ids.iter().any(|s| s == subject))
    }

    /// Every `(subject, created)` pair committed so far.
    pub fn committed_pairs(&self) -> Vec<(String, Timestamp)> {
        self.state
            .lock()
            .committed
            .iter()
            .flat_map(|b| b.subject_ids.iter().map(move |s| (s.clone(), b.created)))
            .collect()
    }
}
