//! # Core Types Module
//!
//! Data shapes shared by sources, aggregation and the published readings.
//!
//! * `CpuCounters` - Monotonic per-key jiffy counters (`/proc/stat` style)
//! * `RawValue` - One entry of a raw snapshot: counters or an instantaneous value
//! * `RawSnapshot` - Everything a source produced on one call, keyed by a stable id
//! * `ReadingValue` - One published value (number, boolean or text)
//! * `Readings` - The mapping callers of `readings()` receive
//! * `Percentage` - A value clamped to 0.0..=100.0
//!
//! ## Example
//!
//! ```rust
//! use sensor_poller::core::types::{CpuCounters, RawSnapshot, ReadingValue};
//!
//! let snapshot = RawSnapshot::new()
//!     .with_counters("cpu0", CpuCounters { user: 10, idle: 90, ..Default::default() })
//!     .with_value("governor", ReadingValue::from("ondemand"));
//! assert_eq!(snapshot.len(), 2);
//! ```

use std::collections::{btree_map, BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Represents a percentage value between 0.0 and 100.0
///
/// ```rust
/// use sensor_poller::core::types::Percentage;
///
/// assert_eq!(Percentage::new(75.0).unwrap().as_f64(), 75.0);
/// assert!(Percentage::new(150.0).is_none());
/// assert_eq!(Percentage::from_f64(-3.0).as_f64(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    /// Returns None if the value is outside 0..=100
    pub fn new(value: f64) -> Option<Self> {
        if (0.0..=100.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Clamps into 0.0..=100.0
    pub fn from_f64(value: f64) -> Self {
        Self(value.clamp(0.0, 100.0))
    }
}

/// Cumulative time counters for one CPU (or any device using the same accounting)
///
/// All fields are monotonically non-decreasing while the device is up. Sums are widened
/// to `u128` so long-uptime values never wrap when added together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuCounters {
    /// Time spent doing nothing useful: idle plus waiting on I/O
    pub fn idle_total(&self) -> u128 {
        u128::from(self.idle) + u128::from(self.iowait)
    }

    pub fn busy_total(&self) -> u128 {
        [self.user, self.nice, self.system, self.irq, self.softirq, self.steal]
            .into_iter()
            .map(u128::from)
            .sum()
    }

    pub fn total(&self) -> u128 {
        self.idle_total() + self.busy_total()
    }
}

/// A published value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ReadingValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReadingValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReadingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReadingValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for ReadingValue {
    fn from(value: f64) -> Self {
        ReadingValue::Number(value)
    }
}

impl From<bool> for ReadingValue {
    fn from(value: bool) -> Self {
        ReadingValue::Bool(value)
    }
}

impl From<&str> for ReadingValue {
    fn from(value: &str) -> Self {
        ReadingValue::Text(value.to_string())
    }
}

impl From<String> for ReadingValue {
    fn from(value: String) -> Self {
        ReadingValue::Text(value)
    }
}

/// What callers of `readings()` receive
pub type Readings = HashMap<String, ReadingValue>;

/// One entry of a raw snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Counters(CpuCounters),
    Value(ReadingValue),
}

/// Unprocessed output of a single source call
///
/// Keys are stable identifiers (core id, device id, field name). A snapshot is immutable
/// once a source has returned it; the builder methods only exist to assemble one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    entries: BTreeMap<String, RawValue>,
}

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counters(mut self, key: impl Into<String>, counters: CpuCounters) -> Self {
        self.insert(key, RawValue::Counters(counters));
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<ReadingValue>) -> Self {
        self.insert(key, RawValue::Value(value.into()));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RawValue> {
        self.entries.iter()
    }

    /// Only the counter entries, in key order
    pub fn counters(&self) -> impl Iterator<Item = (&str, &CpuCounters)> {
        self.entries.iter().filter_map(|(key, value)| match value {
            RawValue::Counters(c) => Some((key.as_str(), c)),
            RawValue::Value(_) => None,
        })
    }

    /// Only the instantaneous entries, in key order
    pub fn values(&self) -> impl Iterator<Item = (&str, &ReadingValue)> {
        self.entries.iter().filter_map(|(key, value)| match value {
            RawValue::Value(v) => Some((key.as_str(), v)),
            RawValue::Counters(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RawSnapshot {
    type Item = (&'a String, &'a RawValue);
    type IntoIter = btree_map::Iter<'a, String, RawValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
