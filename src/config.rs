//! Sensor configuration.
//!
//! A [`SensorConfig`] is what the host hands to a sensor on construction and on every
//! reconfiguration. It is deliberately lenient: a missing or non-positive polling interval
//! falls back to [`DEFAULT_INTERVAL_MS`] instead of producing a busy loop. Anything that
//! cannot be repaired is rejected by [`SensorConfig::validate`].
//!
//! ```rust
//! use sensor_poller::config::SensorConfig;
//!
//! let config = SensorConfig::from_json(r#"{ "interval_ms": 250 }"#).unwrap();
//! let validated = config.validate().unwrap();
//! assert_eq!(validated.window_capacity, 4);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{window::capacity_for_interval, Error, Result};

/// Polling interval used when the configured one is zero or negative
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Upper bound on a single source call when the configuration does not set one
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 50;

/// Decimal places kept in published percentages
pub const DEFAULT_PRECISION: u32 = 2;

const MAX_PRECISION: u32 = 6;

/// How numeric readings are smoothed before publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// Publish the latest value as-is
    #[default]
    None,
    /// Publish the mean over the rolling window
    Mean,
}

/// Raw, host-provided configuration for one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Polling interval in milliseconds; non-positive values fall back to the default
    pub interval_ms: i64,
    /// Bound on one source call in milliseconds; zero means [`DEFAULT_SOURCE_TIMEOUT_MS`]
    pub source_timeout_ms: u64,
    pub smoothing: Smoothing,
    /// Decimal places for derived percentages
    pub precision: u32,
    /// Free-form settings consumed by source factories (paths, device ids)
    pub attributes: BTreeMap<String, String>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS as i64,
            source_timeout_ms: 0,
            smoothing: Smoothing::None,
            precision: DEFAULT_PRECISION,
            attributes: BTreeMap::new(),
        }
    }
}

impl SensorConfig {
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms, ..Self::default() }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_source_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.source_timeout_ms = timeout_ms;
        self
    }

    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Resolves defaults and checks the remaining fields
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the precision is out of range or the source
    /// timeout is not shorter than the polling interval.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let interval_ms = if self.interval_ms <= 0 {
            tracing::debug!(configured = self.interval_ms, "non-positive interval, using default");
            DEFAULT_INTERVAL_MS
        } else {
            self.interval_ms as u64
        };

        let timeout_ms = if self.source_timeout_ms == 0 { DEFAULT_SOURCE_TIMEOUT_MS } else { self.source_timeout_ms };

        if self.precision > MAX_PRECISION {
            return Err(Error::invalid_config(format!(
                "precision {} exceeds the maximum of {}",
                self.precision, MAX_PRECISION
            )));
        }

        // An explicitly configured timeout must leave room for the next tick. The default
        // is allowed to overrun very short intervals since the loop skips missed ticks.
        if self.source_timeout_ms != 0 && timeout_ms >= interval_ms {
            return Err(Error::invalid_config(format!(
                "source timeout {}ms must be shorter than the interval {}ms",
                timeout_ms, interval_ms
            )));
        }

        let interval = Duration::from_millis(interval_ms);
        Ok(ValidatedConfig {
            interval,
            source_timeout: Duration::from_millis(timeout_ms),
            smoothing: self.smoothing,
            precision: self.precision,
            window_capacity: capacity_for_interval(interval),
        })
    }
}

/// Configuration with every default resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedConfig {
    pub interval: Duration,
    pub source_timeout: Duration,
    pub smoothing: Smoothing,
    pub precision: u32,
    /// Rolling window size spanning roughly one second of samples
    pub window_capacity: usize,
}
