use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::metrics::snapshot::TreeMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for tree metrics snapshots.
///
/// Writes the Prometheus text exposition format, so the output can be
/// scraped directly or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write> MetricsExporter<TreeMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &TreeMetricsSnapshot) {
        let counters = [
            ("lookups_total", snapshot.lookups),
            ("hits_total", snapshot.hits),
            ("fast_path_hits_total", snapshot.fast_path_hits),
            ("misses_total", snapshot.misses),
            ("leaves_created_total", snapshot.leaves_created),
            ("leaves_evicted_total", snapshot.leaves_evicted),
            ("storages_created_total", snapshot.storages_created),
            ("storages_destroyed_total", snapshot.storages_destroyed),
            ("probes_total", snapshot.probes),
            ("probe_hits_total", snapshot.probe_hits),
        ];
        for (suffix, value) in counters {
            self.write_metric("counter", suffix, value);
        }
        self.write_metric("gauge", "leaves", snapshot.leaves as u64);
        self.write_metric("gauge", "storages", snapshot.storages as u64);
    }
}
