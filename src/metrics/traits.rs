//! # Metrics traits
//!
//! Recording, snapshotting, and export are separate concerns:
//!
//! ```text
//!   ┌──────────────────────────┐   ┌──────────────────────────┐
//!   │ TreeMetricsRecorder      │   │ TreeMetricsReadRecorder  │
//!   │ (&mut self: lookups,     │   │ (&self: probes)          │
//!   │  evictions, storages)    │   │                          │
//!   └────────────┬─────────────┘   └────────────┬─────────────┘
//!                └───────────────┬──────────────┘
//!                                ▼
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │───►│ MetricsExporter<S>           │
//!   │ (tests, benches)             │    │ (monitoring)                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters written by mutating tree operations.
pub trait TreeMetricsRecorder {
    fn record_lookup(&mut self);
    fn record_hit(&mut self);
    fn record_fast_path_hit(&mut self);
    fn record_miss(&mut self);
    fn record_leaf_created(&mut self);
    fn record_leaf_evicted(&mut self);
    fn record_storage_created(&mut self);
    fn record_storage_destroyed(&mut self);
}

/// Counters written by read-only tree operations.
pub trait TreeMetricsReadRecorder {
    fn record_probe(&self);
    fn record_probe_hit(&self);
}

/// Produces a point-in-time copy of the counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes a snapshot somewhere.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
