//! # Samples
//!
//! A [`Sample`] is one captured value together with the moment it was taken. Sensors
//! build one per tick and fold it into a rolling window or a published reading; nothing
//! keeps samples beyond that.
//!
//! ```rust
//! use sensor_poller::core::metrics::Sample;
//!
//! let sample = Sample::new(42.5);
//! assert_eq!(sample.value, 42.5);
//! ```
use std::time::SystemTime;

/// A single captured value with its timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    /// The captured value
    pub value: T,
    /// When the value was captured
    pub timestamp: SystemTime,
}

impl<T> Sample<T> {
    /// Creates a new sample stamped with the current time
    pub fn new(value: T) -> Self {
        Self { value, timestamp: SystemTime::now() }
    }

    /// Creates a new sample with a specific timestamp
    pub fn with_timestamp(value: T, timestamp: SystemTime) -> Self {
        Self { value, timestamp }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sample<U> {
        Sample { value: f(self.value), timestamp: self.timestamp }
    }
}
