//! # BFD Telemetry
//!
//! Structured logging for the loaded filter index and its hosts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bfd_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_tracing(&config).expect("Failed to init telemetry");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BFD_SERVICE_NAME` | `bfd-server` | Service name in startup records |
//! | `BFD_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `BFD_CONSOLE_OUTPUT` | `true` | Write records to stdout |
//! | `BFD_JSON_LOGS` | `false` | JSON records (default `true` in containers) |

mod config;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use tracing_setup::{env_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
