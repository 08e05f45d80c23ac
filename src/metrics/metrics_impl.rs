use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::TreeMetricsSnapshot;
use crate::metrics::traits::{TreeMetricsReadRecorder, TreeMetricsRecorder};

#[derive(Debug, Default)]
pub struct TreeMetrics {
    pub lookups: u64,
    pub hits: u64,
    pub fast_path_hits: u64,
    pub misses: u64,
    pub leaves_created: u64,
    pub leaves_evicted: u64,
    pub storages_created: u64,
    pub storages_destroyed: u64,
    pub probes: MetricsCell,
    pub probe_hits: MetricsCell,
}

impl TreeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the counters, adding the gauges the caller measured.
    pub fn snapshot(&self, leaves: usize, storages: usize) -> TreeMetricsSnapshot {
        TreeMetricsSnapshot {
            lookups: self.lookups,
            hits: self.hits,
            fast_path_hits: self.fast_path_hits,
            misses: self.misses,
            leaves_created: self.leaves_created,
            leaves_evicted: self.leaves_evicted,
            storages_created: self.storages_created,
            storages_destroyed: self.storages_destroyed,
            probes: self.probes.get(),
            probe_hits: self.probe_hits.get(),
            leaves,
            storages,
        }
    }
}

impl TreeMetricsRecorder for TreeMetrics {
    fn record_lookup(&mut self) {
        self.lookups += 1;
    }

    fn record_hit(&mut self) {
        self.hits += 1;
    }

    fn record_fast_path_hit(&mut self) {
        self.hits += 1;
        self.fast_path_hits += 1;
    }

    fn record_miss(&mut self) {
        self.misses += 1;
    }

    fn record_leaf_created(&mut self) {
        self.leaves_created += 1;
    }

    fn record_leaf_evicted(&mut self) {
        self.leaves_evicted += 1;
    }

    fn record_storage_created(&mut self) {
        self.storages_created += 1;
    }

    fn record_storage_destroyed(&mut self) {
        self.storages_destroyed += 1;
    }
}

impl TreeMetricsReadRecorder for &TreeMetrics {
    fn record_probe(&self) {
        self.probes.incr();
    }

    fn record_probe_hit(&self) {
        self.probe_hits.incr();
    }
}
