//! Counter delta aggregation.
//!
//! Turns two chronologically ordered snapshots of monotonic counters into an instantaneous
//! busy percentage per key. The tracker keeps only the previous snapshot's counters; every
//! update replaces that baseline wholesale.

use std::collections::HashMap;

use crate::core::types::{CpuCounters, Percentage, RawSnapshot};

/// Busy percentage between two counter readings of the same key
///
/// Returns `Some(0.0)` when no time elapsed between the readings and `None` when either the
/// idle or the total counter went backwards (device reset or counter wrap), since no
/// meaningful rate exists for that interval. The result is not rounded.
pub fn usage_percent(prev: &CpuCounters, curr: &CpuCounters) -> Option<f64> {
    let total_delta = curr.total().checked_sub(prev.total())?;
    let idle_delta = curr.idle_total().checked_sub(prev.idle_total())?;

    if total_delta == 0 {
        return Some(0.0);
    }

    // Busy counters went backwards while idle grew by more than the total.
    let busy_delta = total_delta.checked_sub(idle_delta)?;
    // Clamped: float division of huge u128 values can land a hair above 100.
    Some(Percentage::from_f64(busy_delta as f64 * 100.0 / total_delta as f64).as_f64())
}

/// Rounds half away from zero to `places` decimals
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Derives per-key usage percentages from successive counter snapshots
#[derive(Debug, Clone)]
pub struct DeltaAggregator {
    previous: Option<HashMap<String, CpuCounters>>,
    precision: u32,
}

impl DeltaAggregator {
    pub fn new(precision: u32) -> Self {
        Self { previous: None, precision }
    }

    /// Folds a new snapshot in and returns usage for every key seen in both snapshots
    ///
    /// Keys that are new in `snapshot` are skipped for this call and become part of the
    /// baseline for the next one. Non-counter entries are ignored.
    pub fn update(&mut self, snapshot: &RawSnapshot) -> HashMap<String, f64> {
        let current: HashMap<String, CpuCounters> =
            snapshot.counters().map(|(key, counters)| (key.to_string(), *counters)).collect();

        let mut usage = HashMap::with_capacity(current.len());
        if let Some(previous) = &self.previous {
            for (key, curr) in &current {
                let Some(prev) = previous.get(key) else {
                    tracing::trace!(key = %key, "no baseline for key, skipping");
                    continue;
                };
                match usage_percent(prev, curr) {
                    Some(pct) => {
                        usage.insert(key.clone(), round_to(pct, self.precision));
                    },
                    None => {
                        tracing::debug!(key = %key, "counters went backwards, resetting baseline");
                    },
                }
            }
        }

        self.previous = Some(current);
        usage
    }

    /// Whether a baseline snapshot has been recorded
    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
