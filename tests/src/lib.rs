//! # BFD Loaded Filter Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Pipeline simulator writing to an in-memory store
//! └── integration/      # Refresh, trim and read-path flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bfd-tests
//!
//! # By category
//! cargo test -p bfd-tests integration::
//!
//! # Benchmarks
//! cargo bench -p bfd-tests
//! ```

pub mod fixtures;
pub mod integration;
