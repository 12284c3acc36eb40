use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use sensor_poller::{
    config::{SensorConfig, Smoothing},
    core::types::ReadingValue,
    error::Error,
    registry::SensorRegistry,
    sensor::Sensor,
    traits::ManagedSensor,
};

use crate::common::{proc_stat_at, wait_for, Behavior, InstrumentedSource};

fn number(sensor: &Sensor, key: &str) -> Option<f64> {
    sensor.readings().get(key).and_then(ReadingValue::as_f64)
}

#[tokio::test]
async fn test_cpu_counters_become_usage() {
    let source = Arc::new(InstrumentedSource::new("cpu", Behavior::Cpu { busy: 40, idle: 60 }));
    let sensor = Sensor::new("cpu", source, SensorConfig::new(5)).unwrap();

    assert!(sensor.readings().is_empty());
    wait_for(|| number(&sensor, "cpu").is_some()).await;
    assert_eq!(number(&sensor, "cpu"), Some(40.0));

    sensor.close().await;
    // Readings survive the close
    assert_eq!(number(&sensor, "cpu"), Some(40.0));
}

#[tokio::test]
async fn test_instant_values_pass_through() {
    let source = Arc::new(InstrumentedSource::new("temp", Behavior::Fixed(47.25)));
    let sensor = Sensor::new("temp", source, SensorConfig::new(5)).unwrap();

    // No baseline needed for instantaneous values
    wait_for(|| sensor.generation() >= 1).await;
    assert_eq!(number(&sensor, "value"), Some(47.25));
    sensor.close().await;
}

#[tokio::test]
async fn test_mean_smoothing_over_constant_input() {
    let source = Arc::new(InstrumentedSource::new("cpu", Behavior::Cpu { busy: 10, idle: 30 }));
    let config = SensorConfig::new(5).with_smoothing(Smoothing::Mean);
    let sensor = Sensor::new("cpu", source, config).unwrap();

    wait_for(|| sensor.generation() >= 3).await;
    assert_eq!(number(&sensor, "cpu"), Some(25.0));
    sensor.close().await;
}

struct StatFile(PathBuf);

impl StatFile {
    fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!("sensor-poller-it-{}-{}", tag, std::process::id()));
        let file = Self(path);
        file.advance(1);
        file
    }

    /// Replaces the file in one rename so readers never see a partial write
    fn advance(&self, tick: u64) {
        let staging = self.0.with_extension("tmp");
        fs::write(&staging, proc_stat_at(tick)).unwrap();
        fs::rename(&staging, &self.0).unwrap();
    }
}

impl Drop for StatFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[cfg(feature = "linux-sources")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registry_cpu_sensor_end_to_end() {
    let stat = Arc::new(StatFile::new("registry"));
    let registry = SensorRegistry::linux_defaults();
    let config = SensorConfig::new(10).with_attribute("path", stat.0.to_string_lossy());

    let sensor = Sensor::from_registry(&registry, "linux:cpu", "host-cpu", config).unwrap();

    let writer = {
        let stat = Arc::clone(&stat);
        tokio::spawn(async move {
            for tick in 2.. {
                tokio::time::sleep(Duration::from_millis(7)).await;
                stat.advance(tick);
            }
        })
    };

    // Two reads of the same file content yield 0% until the writer moves it forward
    wait_for(|| number(&sensor, "cpu") == Some(20.0)).await;
    let readings = sensor.readings();
    assert_eq!(readings["cpu0"], ReadingValue::Number(30.0));
    assert_eq!(readings["cpu1"], ReadingValue::Number(10.0));
    assert!(!readings.contains_key("ctxt"));

    writer.abort();
    sensor.close().await;
}

#[tokio::test]
async fn test_registry_rejects_unknown_model() {
    let registry = SensorRegistry::new();
    let result = Sensor::from_registry(&registry, "acme:gpu", "gpu", SensorConfig::default());
    assert!(matches!(result, Err(Error::UnknownModel(_))));
}

#[tokio::test]
async fn test_managed_sensor_trait_object() {
    let source = Arc::new(InstrumentedSource::new("power", Behavior::Fixed(5.1)));
    let sensor: Box<dyn ManagedSensor> = Box::new(Sensor::new("power", source, SensorConfig::new(5)).unwrap());

    assert_eq!(sensor.name(), "power");
    wait_for(|| !sensor.readings().is_empty()).await;
    assert_eq!(sensor.readings()["value"], ReadingValue::Number(5.1));

    sensor.reconfigure(SensorConfig::new(50)).await.unwrap();
    assert!(!sensor.readings().is_empty());
    sensor.close().await;
}
