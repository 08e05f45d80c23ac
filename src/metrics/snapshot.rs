use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeMetricsSnapshot {
    pub lookups: u64,
    pub hits: u64,
    pub fast_path_hits: u64, // hits answered from the last-path cache
    pub misses: u64,

    pub leaves_created: u64,
    pub leaves_evicted: u64,
    pub storages_created: u64,
    pub storages_destroyed: u64,

    pub probes: u64,
    pub probe_hits: u64,

    // gauges captured at snapshot time
    pub leaves: usize,
    pub storages: usize,
}

impl TreeMetricsSnapshot {
    /// Hits over lookups, in `[0.0, 1.0]`.
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

impl fmt::Display for TreeMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeMetrics {{ lookups: {}, hits: {}, hit_rate: {:.2}%, fast_path_hits: {}, \
             misses: {}, leaves: {}, storages: {}, leaves_evicted: {}, storages_destroyed: {} }}",
            self.lookups,
            self.hits,
            self.hit_rate() * 100.0,
            self.fast_path_hits,
            self.misses,
            self.leaves,
            self.storages,
            self.leaves_evicted,
            self.storages_destroyed,
        )
    }
}
