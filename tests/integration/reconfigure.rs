use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use sensor_poller::{config::SensorConfig, error::Error, sensor::Sensor, worker::WorkerState};

use crate::common::{wait_for, Behavior, InstrumentedSource};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rapid_reconfigure_keeps_one_source_call_in_flight() {
    let source = Arc::new(InstrumentedSource::new("cpu", Behavior::Cpu { busy: 1, idle: 3 }).with_delay(Duration::from_millis(2)));
    let sensor = Arc::new(Sensor::new("cpu", source.clone(), SensorConfig::new(3)).unwrap());

    for i in 0..40 {
        sensor.reconfigure(SensorConfig::new(3 + i % 4)).await.unwrap();
        if i % 8 == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
    wait_for(|| source.calls() >= 10).await;
    sensor.close().await;

    assert_eq!(source.peak_concurrency(), 1);
    assert_eq!(sensor.state(), WorkerState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reconfigure_during_timed_out_call_waits_for_it() {
    // Each call outlives the timeout, the interval and the drain at stop
    let source = Arc::new(InstrumentedSource::new("npu", Behavior::Fixed(3.0)).with_delay(Duration::from_millis(300)));
    let config = SensorConfig::new(40).with_source_timeout_ms(20);
    let sensor = Sensor::new("npu", source.clone(), config.clone()).unwrap();

    wait_for(|| source.active() == 1).await;
    sensor.reconfigure(config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(source.peak_concurrency(), 1);
    sensor.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_then_reconfigure_during_timed_out_call() {
    let source = Arc::new(InstrumentedSource::new("npu", Behavior::Fixed(3.0)).with_delay(Duration::from_millis(300)));
    let config = SensorConfig::new(40).with_source_timeout_ms(20);
    let sensor = Sensor::new("npu", source.clone(), config.clone()).unwrap();

    wait_for(|| source.active() == 1).await;
    sensor.close().await;
    assert_eq!(source.active(), 1);

    sensor.reconfigure(config).await.unwrap();
    let calls = source.calls();
    wait_for(|| source.calls() > calls).await;

    assert_eq!(source.peak_concurrency(), 1);
    sensor.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reconfigures_serialize() {
    let source = Arc::new(InstrumentedSource::new("gpu", Behavior::Fixed(12.0)).with_delay(Duration::from_millis(1)));
    let sensor = Arc::new(Sensor::new("gpu", source.clone(), SensorConfig::new(4)).unwrap());

    let tasks = (0..16).map(|i| {
        let sensor = Arc::clone(&sensor);
        tokio::spawn(async move { sensor.reconfigure(SensorConfig::new(4 + i)).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(sensor.state(), WorkerState::Running);
    let interval = sensor.config().await.interval_ms;
    assert!((4..20).contains(&interval));

    sensor.close().await;
    assert_eq!(source.peak_concurrency(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_block_on_reconfigure() {
    let source = Arc::new(InstrumentedSource::new("clock", Behavior::Fixed(1_500.0)).with_delay(Duration::from_millis(5)));
    let sensor = Arc::new(Sensor::new("clock", source, SensorConfig::new(5)).unwrap());
    wait_for(|| !sensor.readings().is_empty()).await;

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let sensor = Arc::clone(&sensor);
            tokio::task::spawn_blocking(move || {
                for _ in 0..2_000 {
                    // Seeded stores keep the last value visible across every swap
                    assert_eq!(sensor.readings().len(), 1);
                }
            })
        })
        .collect();

    for i in 0..10 {
        sensor.reconfigure(SensorConfig::new(5 + i)).await.unwrap();
    }

    for result in join_all(readers).await {
        result.unwrap();
    }
    sensor.close().await;
}

#[tokio::test]
async fn test_switching_source_retires_old_one() {
    let old = Arc::new(InstrumentedSource::new("old", Behavior::Fixed(1.0)));
    let new = Arc::new(InstrumentedSource::new("new", Behavior::Fixed(2.0)));
    let sensor = Sensor::new("swap", old.clone(), SensorConfig::new(5)).unwrap();
    wait_for(|| old.calls() >= 2).await;

    sensor.reconfigure_with_source(SensorConfig::new(5), new.clone()).await.unwrap();
    let retired_at = old.calls();
    assert_eq!(old.active(), 0);

    wait_for(|| sensor.readings().get("value").and_then(|v| v.as_f64()) == Some(2.0)).await;
    assert_eq!(old.calls(), retired_at);
    assert!(new.calls() >= 1);
    sensor.close().await;
}

#[tokio::test]
async fn test_rejected_reconfigure_leaves_polling_untouched() {
    let source = Arc::new(InstrumentedSource::new("cpu", Behavior::Cpu { busy: 1, idle: 1 }));
    let sensor = Sensor::new("cpu", source.clone(), SensorConfig::new(5)).unwrap();

    let too_precise = SensorConfig::new(5).with_precision(12);
    assert!(matches!(sensor.reconfigure(too_precise).await, Err(Error::InvalidConfig(_))));

    let before = source.calls();
    wait_for(|| source.calls() > before + 2).await;
    assert_eq!(sensor.config().await.interval_ms, 5);
    sensor.close().await;
}

#[tokio::test]
async fn test_reconfigure_after_close_resumes() {
    let source = Arc::new(InstrumentedSource::new("mem", Behavior::Fixed(0.5)));
    let sensor = Sensor::new("mem", source.clone(), SensorConfig::new(5)).unwrap();
    sensor.close().await;
    let calls = source.calls();

    sensor.reconfigure(SensorConfig::new(5)).await.unwrap();
    wait_for(|| source.calls() > calls).await;
    assert_eq!(sensor.state(), WorkerState::Running);
    sensor.close().await;
}
