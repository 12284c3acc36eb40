use std::{collections::HashMap, sync::Arc};

use crate::{
    aggregate::{round_to, DeltaAggregator},
    config::{Smoothing, ValidatedConfig},
    core::{
        metrics::Sample,
        types::{RawSnapshot, ReadingValue, Readings},
    },
    store::SnapshotStore,
    window::RollingWindow,
};

/// Per-worker state that turns raw snapshots into published readings
///
/// Counter entries go through the delta aggregator, instantaneous entries are taken as-is,
/// and numeric results are optionally averaged over the rolling window. Everything is
/// computed before the store is touched.
pub(crate) struct Pipeline {
    aggregator: DeltaAggregator,
    window: RollingWindow<Sample<HashMap<String, f64>>>,
    smoothing: Smoothing,
    precision: u32,
    store: Arc<SnapshotStore>,
}

impl Pipeline {
    pub(crate) fn new(config: &ValidatedConfig, store: Arc<SnapshotStore>) -> Self {
        Self {
            aggregator: DeltaAggregator::new(config.precision),
            window: RollingWindow::new(config.window_capacity),
            smoothing: config.smoothing,
            precision: config.precision,
            store,
        }
    }

    pub(crate) fn ingest(&mut self, snapshot: RawSnapshot) {
        let mut numeric = self.aggregator.update(&snapshot);
        let mut other = Readings::new();

        for (key, value) in snapshot.values() {
            match value {
                ReadingValue::Number(v) => {
                    numeric.insert(key.to_string(), *v);
                },
                _ => {
                    other.insert(key.to_string(), value.clone());
                },
            }
        }

        // First delta tick only sets the baseline; there is nothing to publish yet.
        if numeric.is_empty() && other.is_empty() {
            return;
        }

        let numeric = match self.smoothing {
            Smoothing::None => numeric,
            Smoothing::Mean => {
                self.window.push(Sample::new(numeric));
                self.window_mean()
            },
        };

        let mut readings: Readings =
            numeric.into_iter().map(|(key, value)| (key, ReadingValue::Number(value))).collect();
        readings.extend(other);

        self.store.publish(readings);
    }

    /// Per-key mean over the samples that carry the key
    fn window_mean(&self) -> HashMap<String, f64> {
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
        for sample in self.window.items() {
            for (key, value) in sample.value {
                let entry = sums.entry(key).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(key, (sum, count))| (key, round_to(sum / count as f64, self.precision)))
            .collect()
    }
}
