//! Tree counters, compiled in with the `metrics` feature.

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::TreeMetrics;
pub use snapshot::TreeMetricsSnapshot;
pub use traits::{MetricsExporter, MetricsSnapshotProvider};
