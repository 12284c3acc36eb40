//! Latest-reading store.
//!
//! The polling task computes a full [`Readings`] map first and then swaps it in under a
//! short exclusive lock. Readers take the shared lock just long enough to clone the `Arc`,
//! so a reader never waits on a source call or on aggregation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::RwLock;

use crate::core::types::Readings;

/// Holds the most recently published readings of one sensor
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Readings>>,
    generation: AtomicU64,
}

impl SnapshotStore {
    /// An empty store; readers get an empty map until the first publish
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out serving `readings` without counting as a publish
    pub fn seeded(readings: Readings) -> Self {
        Self { current: RwLock::new(Arc::new(readings)), generation: AtomicU64::new(0) }
    }

    /// Replaces the current readings
    pub fn publish(&self, readings: Readings) {
        let next = Arc::new(readings);
        *self.current.write() = next;
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Copy of the current readings
    pub fn readings(&self) -> Readings {
        self.shared().as_ref().clone()
    }

    /// The current readings without copying the map
    pub fn shared(&self) -> Arc<Readings> {
        Arc::clone(&self.current.read())
    }

    /// Number of publishes so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
