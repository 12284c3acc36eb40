//! # Sensors
//!
//! A [`Sensor`] ties one [`Source`] to one polling [`Worker`], one rolling window and one
//! [`SnapshotStore`]. It is the unit a host framework creates, reads and reconfigures.
//!
//! ## Reconfiguration
//!
//! [`Sensor::reconfigure`] runs under the sensor's configuration lock:
//!
//! 1. validate the new configuration and probe the source; on failure the running worker
//!    is left untouched
//! 2. stop the current worker and wait for it to exit
//! 3. build a fresh store (seeded with the last readings) and pipeline sized for the new
//!    interval, and swap the store in
//! 4. start the new worker
//!
//! Readers never take the configuration lock. They read whichever store is current, so
//! during step 2 they keep seeing the last readings of the old worker.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sensor_poller::{config::SensorConfig, sensor::Sensor, sources::ProcStatSource};
//!
//! #[tokio::main]
//! async fn main() -> sensor_poller::Result<()> {
//!     let source = Arc::new(ProcStatSource::new("/proc/stat"));
//!     let sensor = Sensor::new("cpu", source, SensorConfig::new(500))?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//!     println!("{:?}", sensor.readings());
//!
//!     sensor.close().await;
//!     Ok(())
//! }
//! ```

mod pipeline;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    config::{SensorConfig, ValidatedConfig},
    core::types::Readings,
    registry::SensorRegistry,
    store::SnapshotStore,
    traits::{ManagedSensor, Source},
    worker::{Worker, WorkerState},
    Result,
};

use pipeline::Pipeline;

struct Control {
    worker: Worker,
    config: SensorConfig,
    source: Arc<dyn Source>,
}

/// A polled sensor with a synchronous read side
pub struct Sensor {
    name: String,
    store: RwLock<Arc<SnapshotStore>>,
    control: Mutex<Control>,
    state: Arc<parking_lot::Mutex<WorkerState>>,
}

impl Sensor {
    /// Builds the sensor and starts polling
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the configuration or probe error; no worker is started in that case.
    pub fn new(name: impl Into<String>, source: Arc<dyn Source>, config: SensorConfig) -> Result<Self> {
        let name = name.into();
        let validated = config.validate()?;
        source.probe()?;

        let store = Arc::new(SnapshotStore::new());
        let mut worker = Worker::new(name.clone());
        start_worker(&mut worker, &validated, &source, Arc::clone(&store))?;
        let state = worker.state_handle();

        Ok(Self {
            name,
            store: RwLock::new(store),
            control: Mutex::new(Control { worker, config, source }),
            state,
        })
    }

    /// Looks `model` up in `registry`, builds its source and starts the sensor
    pub fn from_registry(
        registry: &SensorRegistry,
        model: &str,
        name: impl Into<String>,
        config: SensorConfig,
    ) -> Result<Self> {
        let source = registry.build_source(model, &config)?;
        Self::new(name, source, config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest published readings, or an empty map if nothing was published yet
    pub fn readings(&self) -> Readings {
        self.current_store().readings()
    }

    /// Number of publishes by the current worker's store
    pub fn generation(&self) -> u64 {
        self.current_store().generation()
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// The configuration the sensor is currently running with
    pub async fn config(&self) -> SensorConfig {
        self.control.lock().await.config.clone()
    }

    /// Replaces the worker, keeping the current source
    pub async fn reconfigure(&self, config: SensorConfig) -> Result<()> {
        let mut control = self.control.lock().await;
        let source = Arc::clone(&control.source);
        self.apply(&mut control, config, source).await
    }

    /// Replaces the worker and the source it polls
    pub async fn reconfigure_with_source(&self, config: SensorConfig, source: Arc<dyn Source>) -> Result<()> {
        let mut control = self.control.lock().await;
        self.apply(&mut control, config, source).await
    }

    /// Stops polling; safe to call repeatedly
    ///
    /// Readings published before the close stay readable. A later `reconfigure` starts
    /// polling again.
    pub async fn close(&self) {
        let mut control = self.control.lock().await;
        control.worker.stop().await;
    }

    async fn apply(&self, control: &mut Control, config: SensorConfig, source: Arc<dyn Source>) -> Result<()> {
        let validated = config.validate()?;
        source.probe()?;

        control.worker.stop().await;

        let store = Arc::new(SnapshotStore::seeded(self.readings()));
        *self.store.write() = Arc::clone(&store);

        start_worker(&mut control.worker, &validated, &source, store)?;
        control.config = config;
        control.source = source;

        info!(sensor = %self.name, interval_ms = validated.interval.as_millis() as u64, "sensor reconfigured");
        Ok(())
    }

    fn current_store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store.read())
    }
}

fn start_worker(
    worker: &mut Worker,
    config: &ValidatedConfig,
    source: &Arc<dyn Source>,
    store: Arc<SnapshotStore>,
) -> Result<()> {
    let mut pipeline = Pipeline::new(config, store);
    worker.start(config.interval, config.source_timeout, Arc::clone(source), move |snapshot| {
        pipeline.ingest(snapshot)
    })
}

#[async_trait]
impl ManagedSensor for Sensor {
    fn name(&self) -> &str {
        Sensor::name(self)
    }

    fn readings(&self) -> Readings {
        Sensor::readings(self)
    }

    async fn reconfigure(&self, config: SensorConfig) -> Result<()> {
        Sensor::reconfigure(self, config).await
    }

    async fn close(&self) {
        Sensor::close(self).await
    }
}
