//! Loaded filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use bfd_loaded_filters::FilterConfigBuilder;
//! use std::time::Duration;
//!
//! let config = FilterConfigBuilder::new()
//!     .false_positive_rate(0.01)
//!     .refresh_interval(Duration::from_secs(1))
//!     .build()?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Default target false positive rate per file filter.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Default delay between the end of one refresh and the start of the next.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Default delay before the first refresh.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Loaded filter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Target false positive rate of each file filter, in (0, 1)
    pub false_positive_rate: f64,
    /// Fixed delay between refreshes
    pub refresh_interval: Duration,
    /// Delay before the first refresh
    pub initial_delay: Duration,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl FilterConfig {
    /// Read configuration from the environment.
    ///
    /// - `BFD_FILTER_FPR`
    /// - `BFD_FILTER_REFRESH_MS`
    /// - `BFD_FILTER_INITIAL_DELAY_MS`
    ///
    /// Missing or unparseable values fall back to the defaults. The result is
    /// not validated; call [`FilterConfig::validate`] before use.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            false_positive_rate: env_parse("BFD_FILTER_FPR")
                .unwrap_or(defaults.false_positive_rate),
            refresh_interval: env_parse("BFD_FILTER_REFRESH_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_interval),
            initial_delay: env_parse("BFD_FILTER_INITIAL_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_delay),
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        let fpr = self.false_positive_rate;
        if !(fpr > 0.0 && fpr < 1.0) {
            return Err(FilterError::InvalidFPR { fpr });
        }

        if self.refresh_interval.is_zero() {
            return Err(FilterError::InvalidParameters(
                "refresh_interval cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    false_positive_rate: Option<f64>,
    refresh_interval: Option<Duration>,
    initial_delay: Option<Duration>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target false positive rate (strictly between 0 and 1)
    pub fn false_positive_rate(mut self, fpr: f64) -> Self {
        self.false_positive_rate = Some(fpr);
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let defaults = FilterConfig::default();

        let config = FilterConfig {
            false_positive_rate: self
                .false_positive_rate
                .unwrap_or(defaults.false_positive_rate),
            refresh_interval: self.refresh_interval.unwrap_or(defaults.refresh_interval),
            initial_delay: self.initial_delay.unwrap_or(defaults.initial_delay),
        };

        config.validate()?;
        Ok(config)
    }
}
