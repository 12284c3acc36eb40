use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use sensor_poller::{core::types::RawSnapshot, error::Error, traits::Source, Result};

use crate::common::builders::snapshot::TestSnapshotBuilder;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// `cpu` counters advancing by `busy`/`idle` jiffies per call
    Cpu { busy: u64, idle: u64 },
    /// The same numeric value on every call
    Fixed(f64),
    /// Every call fails
    Failing,
}

/// A source that records how often and how concurrently it is called
#[derive(Debug)]
pub struct InstrumentedSource {
    name: String,
    behavior: Behavior,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl InstrumentedSource {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Each call blocks for `delay` before returning
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were ever in progress at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Source for InstrumentedSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_snapshot(&self) -> Result<RawSnapshot> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        let tick = self.calls.fetch_add(1, Ordering::SeqCst) as u64;

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let result = match self.behavior {
            Behavior::Cpu { busy, idle } => Ok(TestSnapshotBuilder::new().cpu_after("cpu", tick, busy, idle).build()),
            Behavior::Fixed(value) => Ok(TestSnapshotBuilder::new().value("value", value).build()),
            Behavior::Failing => Err(Error::SourceFailed(format!("{}: device unplugged", self.name))),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
