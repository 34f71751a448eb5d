//! Inbound Ports (Driving Ports)
//!
//! The questions the resource read path asks before running a
//! `_lastUpdated` query.

use shared_types::{DateRange, Timestamp};

/// Freshness index API (Driving Port)
///
/// Both predicates are answered from memory and never block on I/O.
pub trait FreshnessIndex: Send + Sync {
    /// Does `range` overlap the interval covered by the installed filters?
    fn is_in_bounds(&self, range: &DateRange) -> bool;

    /// Is a `_lastUpdated` search for `subject_id` within `range` certain to
    /// return nothing?
    ///
    /// `true` only when no indexed batch could have touched the subject in
    /// that window and the window ends by the last refresh. `false` means
    /// "run the query".
    fn is_result_set_empty(&self, subject_id: &str, range: &DateRange) -> bool;

    /// The last instant the index knows the store was written.
    fn transaction_time(&self) -> Timestamp;
}
