//! Service Layer
//!
//! The stateful manager and the driver that keeps it fresh.

pub mod filter_manager;
pub mod refresh_task;

pub use filter_manager::{
    before_last_updated_feature, FilterManager, FilterSnapshot, RefreshOutcome,
    BEFORE_LAST_UPDATED_FEATURE_SECS,
};
pub use refresh_task::RefreshTask;
