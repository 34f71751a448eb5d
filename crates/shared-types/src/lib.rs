//! # Shared Types Crate
//!
//! Records describing what the data pipeline has loaded, and the query
//! window type used by the resource read path.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the pipeline, the loaded-filter index and the
//!   resource providers all speak these types.
//! - **Immutable Inputs**: a `LoadedBatch` never changes once it is visible;
//!   a `LoadedFile` keeps its `created` instant for its whole life.

pub mod date_range;
pub mod entities;

pub use date_range::DateRange;
pub use entities::*;
