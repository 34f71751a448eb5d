//! # Integration Tests
//!
//! Flows exercising the manager against a store written by the pipeline
//! simulator:
//!
//! - `refresh_flow`: refresh, merge, trim and failure recovery
//! - `read_path`: the resource read path consulting the index

pub mod read_path;
pub mod refresh_flow;
