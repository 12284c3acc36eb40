//! Sensor Poller - a background polling runtime for hardware telemetry sensors
//!
//! Every sensor a host exposes (CPU, GPU, clocks, memory, disk, Wi-Fi, process, power)
//! follows the same shape: sample a data source on a timer, derive a metric, and let a
//! synchronous caller read the latest value while the poller can be replaced at any time.
//! This crate is that shared runtime. Device-specific readers plug in through the
//! [`Source`](traits::Source) trait.
//!
//! # Components
//!
//! - **Worker**: the polling task with an exactly-once stop/restart protocol
//! - **RollingWindow**: fixed-capacity ring buffer for smoothing bursty readings
//! - **DeltaAggregator**: monotonic counter pairs to busy percentages
//! - **SnapshotStore**: the latest readings behind a reader/writer lock
//! - **Sensor**: the facade that ties the four together and handles reconfiguration
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use sensor_poller::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = Arc::new(FnSource::new("load", || Ok(RawSnapshot::new().with_value("load", 0.5))));
//!     let sensor = Sensor::new("load", source, SensorConfig::new(100))?;
//!
//!     // Nothing has been sampled yet, but reading is always safe
//!     assert!(sensor.readings().is_empty());
//!
//!     sensor.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Configuration and probe failures come back from [`Sensor::new`](sensor::Sensor::new)
//! and [`Sensor::reconfigure`](sensor::Sensor::reconfigure). Failures of individual source
//! calls are logged and never reach readers; they keep seeing the last good readings.
//!
//! # Thread Safety
//!
//! `Sensor` is `Send + Sync`. `readings()` is synchronous and never waits on a source
//! call, so it can be called from any thread at any rate.

pub mod aggregate;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod registry;
pub mod sensor;
pub mod sources;
pub mod store;
pub mod traits;
pub mod window;
pub mod worker;

pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::aggregate::DeltaAggregator;
    pub use crate::config::{SensorConfig, Smoothing};
    pub use crate::core::types::{CpuCounters, RawSnapshot, ReadingValue, Readings};
    pub use crate::registry::{SensorDescriptor, SensorKind, SensorRegistry};
    pub use crate::sensor::Sensor;
    pub use crate::sources::FnSource;
    pub use crate::store::SnapshotStore;
    pub use crate::traits::{ManagedSensor, Source};
    pub use crate::window::RollingWindow;
    pub use crate::worker::{Worker, WorkerState};
    pub use crate::Error;
    pub use crate::Result;
}
