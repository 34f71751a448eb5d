//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - queries made by the resource read path
//! - Driven Ports (outbound) - reads from the load-tracking tables

pub mod inbound;
pub mod outbound;

pub use inbound::FreshnessIndex;
pub use outbound::LoadedBatchStore;
