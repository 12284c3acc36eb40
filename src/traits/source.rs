use async_trait::async_trait;

use crate::{
    config::SensorConfig,
    core::types::{RawSnapshot, Readings},
    error::Result,
};

#[cfg(test)]
use mockall::automock;

/// Anything that can produce one raw measurement on demand
///
/// Implementations wrap a single hardware reader: a procfs or sysfs file, a vendor tool's
/// output, a syscall. `read_snapshot` is synchronous and may block; the worker runs it on
/// the blocking pool under a timeout, so an implementation does not need its own. A failed
/// call only costs one tick.
///
/// # Examples
///
/// ```rust
/// use sensor_poller::{core::types::RawSnapshot, traits::Source, Result};
///
/// struct Fixed;
///
/// impl Source for Fixed {
///     fn name(&self) -> String {
///         "fixed".to_string()
///     }
///
///     fn read_snapshot(&self) -> Result<RawSnapshot> {
///         Ok(RawSnapshot::new().with_value("load", 12.0))
///     }
/// }
/// ```
#[cfg_attr(test, automock)]
pub trait Source: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> String;

    /// Takes one snapshot
    fn read_snapshot(&self) -> Result<RawSnapshot>;

    /// Checks that the underlying device is reachable at all
    ///
    /// Called once when a sensor is configured. A failure here rejects the configuration
    /// instead of letting the worker fail every tick.
    fn probe(&self) -> Result<()> {
        Ok(())
    }
}

/// Lifecycle surface a host framework drives sensors through
#[async_trait]
pub trait ManagedSensor: Send + Sync {
    /// Name the sensor was registered under
    fn name(&self) -> &str;

    /// Latest published readings; never blocks on the source
    fn readings(&self) -> Readings;

    /// Replaces the polling worker using the new configuration
    async fn reconfigure(&self, config: SensorConfig) -> Result<()>;

    /// Stops polling and waits for the worker to exit
    async fn close(&self);
}
