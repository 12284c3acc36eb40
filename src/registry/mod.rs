//! Sensor model registry.
//!
//! Hosts describe each sensor model they support once at startup with a
//! [`SensorDescriptor`] and hand the resulting [`SensorRegistry`] to whatever builds
//! sensors. The factory on a descriptor picks the concrete [`Source`] for a configuration,
//! which is how board-specific readers (Raspberry Pi, Jetson, generic Linux) are swapped
//! without touching the polling runtime.
//!
//! ```rust
//! use std::sync::Arc;
//! use sensor_poller::{
//!     core::types::RawSnapshot,
//!     registry::{SensorDescriptor, SensorKind, SensorRegistry},
//!     sources::FnSource,
//!     traits::Source,
//! };
//!
//! let mut registry = SensorRegistry::new();
//! registry.register(SensorDescriptor::new("acme:fan", "acme:sensors:fan", SensorKind::Power, |_config| {
//!     let source = FnSource::new("fan", || Ok(RawSnapshot::new().with_value("rpm", 1200.0)));
//!     Ok(Arc::new(source) as Arc<dyn Source>)
//! }));
//! assert!(registry.get("acme:fan").is_some());
//! ```

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{config::SensorConfig, traits::Source, Error, Result};

/// Broad family a sensor model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Cpu,
    Gpu,
    Clock,
    Memory,
    Disk,
    Wifi,
    Process,
    Power,
    Temperature,
}

/// Builds the source for one configured sensor
pub type SourceFactory = Arc<dyn Fn(&SensorConfig) -> Result<Arc<dyn Source>> + Send + Sync>;

/// Everything the host knows about one sensor model
#[derive(Clone)]
pub struct SensorDescriptor {
    /// Model name sensors are configured with
    pub model: String,
    /// API identifier the host framework registers the model under
    pub api: String,
    pub kind: SensorKind,
    factory: SourceFactory,
}

impl SensorDescriptor {
    pub fn new<F>(model: impl Into<String>, api: impl Into<String>, kind: SensorKind, factory: F) -> Self
    where
        F: Fn(&SensorConfig) -> Result<Arc<dyn Source>> + Send + Sync + 'static,
    {
        Self { model: model.into(), api: api.into(), kind, factory: Arc::new(factory) }
    }

    pub fn build_source(&self, config: &SensorConfig) -> Result<Arc<dyn Source>> {
        (self.factory)(config)
    }
}

impl fmt::Debug for SensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorDescriptor")
            .field("model", &self.model)
            .field("api", &self.api)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Model name to descriptor lookup
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    descriptors: BTreeMap<String, SensorDescriptor>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a descriptor, returning the one it replaced
    pub fn register(&mut self, descriptor: SensorDescriptor) -> Option<SensorDescriptor> {
        self.descriptors.insert(descriptor.model.clone(), descriptor)
    }

    pub fn get(&self, model: &str) -> Option<&SensorDescriptor> {
        self.descriptors.get(model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// # Errors
    ///
    /// [`Error::UnknownModel`] if `model` was never registered, otherwise whatever the
    /// model's factory returns.
    pub fn build_source(&self, model: &str, config: &SensorConfig) -> Result<Arc<dyn Source>> {
        self.get(model).ok_or_else(|| Error::UnknownModel(model.to_string()))?.build_source(config)
    }

    /// Registry with the reference Linux readers
    ///
    /// * `linux:cpu` - `/proc/stat` counters; `path` attribute overrides the file
    /// * `linux:thermal` - thermal zone temperature; `zone` attribute (default 0)
    /// * `linux:devfreq` - devfreq clock; requires a `device` attribute
    #[cfg(feature = "linux-sources")]
    pub fn linux_defaults() -> Self {
        use crate::sources::{ProcStatSource, SysfsValueSource};

        let mut registry = Self::new();
        registry.register(SensorDescriptor::new("linux:cpu", "sensor:linux:cpu", SensorKind::Cpu, |config| {
            let path = config.attribute("path").unwrap_or("/proc/stat");
            Ok(Arc::new(ProcStatSource::new(path)) as Arc<dyn Source>)
        }));
        registry.register(SensorDescriptor::new(
            "linux:thermal",
            "sensor:linux:thermal",
            SensorKind::Temperature,
            |config| {
                let zone = match config.attribute("zone") {
                    Some(zone) => zone
                        .parse::<u32>()
                        .map_err(|e| Error::invalid_config(format!("zone {:?}: {}", zone, e)))?,
                    None => 0,
                };
                Ok(Arc::new(SysfsValueSource::thermal_zone(zone)) as Arc<dyn Source>)
            },
        ));
        registry.register(SensorDescriptor::new("linux:devfreq", "sensor:linux:clock", SensorKind::Clock, |config| {
            let device = config
                .attribute("device")
                .ok_or_else(|| Error::invalid_config("linux:devfreq requires a `device` attribute"))?;
            Ok(Arc::new(SysfsValueSource::devfreq(device)) as Arc<dyn Source>)
        }));
        registry
    }
}
