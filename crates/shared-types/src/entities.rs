//! # Load Tracking Entities
//!
//! The pipeline records every RIF file it starts loading as a `LoadedFile`
//! and every group of records it commits as a `LoadedBatch`. The
//! `LoadedTuple` is the per-file summary used for change detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instant on the UTC timeline.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a loaded file.
pub type FileId = i64;

/// Identifier of a loaded batch.
pub type BatchId = i64;

/// Identifier of a subject (beneficiary) whose records are change-tracked.
pub type SubjectId = String;

/// Separator used when a batch's subject list is persisted as one column.
pub const SUBJECT_SEPARATOR: char = ',';

/// A group of record changes committed together by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedBatch {
    /// Batch identifier.
    pub batch_id: BatchId,
    /// The file this batch was loaded from.
    pub file_id: FileId,
    /// Subjects touched by this batch.
    pub subject_ids: Vec<SubjectId>,
    /// When the batch was committed.
    pub created: Timestamp,
}

impl LoadedBatch {
    /// Create a batch from an explicit subject list.
    pub fn new(
        batch_id: BatchId,
        file_id: FileId,
        subject_ids: Vec<SubjectId>,
        created: Timestamp,
    ) -> Self {
        Self {
            batch_id,
            file_id,
            subject_ids,
            created,
        }
    }

    /// Create a batch from the comma-joined subject column used by the store.
    ///
    /// Entries are trimmed and blank entries are skipped.
    pub fn from_joined(
        batch_id: BatchId,
        file_id: FileId,
        joined_subjects: &str,
        created: Timestamp,
    ) -> Self {
        let subject_ids = joined_subjects
            .split(SUBJECT_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(batch_id, file_id, subject_ids, created)
    }

    /// Join the subject list back into the persisted column form.
    pub fn joined_subjects(&self) -> String {
        self.subject_ids.join(&SUBJECT_SEPARATOR.to_string())
    }

    /// Number of subjects in this batch.
    pub fn subject_count(&self) -> usize {
        self.subject_ids.len()
    }
}

/// A source file registered by the pipeline when loading starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedFile {
    /// File identifier.
    pub file_id: FileId,
    /// RIF record kind, e.g. `BENEFICIARY` or `CARRIER`.
    pub kind: String,
    /// When the file was first seen. Never changes.
    pub created: Timestamp,
}

impl LoadedFile {
    pub fn new(file_id: FileId, kind: impl Into<String>, created: Timestamp) -> Self {
        Self {
            file_id,
            kind: kind.into(),
            created,
        }
    }
}

/// Per-file summary: `(file_id, file created, max(batch created))`.
///
/// If a file's `last_updated` is unchanged since the previous refresh, its
/// filter does not need rebuilding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedTuple {
    /// The loaded file.
    pub file_id: FileId,
    /// The file's `created` instant.
    pub first_updated: Timestamp,
    /// The newest `created` instant among the file's batches.
    pub last_updated: Timestamp,
}

impl LoadedTuple {
    pub fn new(file_id: FileId, first_updated: Timestamp, last_updated: Timestamp) -> Self {
        Self {
            file_id,
            first_updated,
            last_updated,
        }
    }
}
