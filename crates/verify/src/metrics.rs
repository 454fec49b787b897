//! Conflict counters with Prometheus text rendering

use dashmap::DashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use tr_types::ConflictRecord;

/// Name of the conflict counter
pub const CONFLICT_METRIC_NAME: &str = "tr_trust_receive_verified_conflict_total";

/// Label set identifying one conflict series.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictLabels {
    pub url: String,
    /// Stored fingerprint
    pub hash: String,
    /// Reported fingerprint
    pub conflict_hash: String,
    pub last_modified: String,
    pub file_size: u64,
}

impl From<&ConflictRecord> for ConflictLabels {
    fn from(record: &ConflictRecord) -> Self {
        Self {
            url: record.url.clone(),
            hash: record.stored.clone(),
            conflict_hash: record.reported.clone(),
            last_modified: record.last_modified.clone(),
            file_size: record.size,
        }
    }
}

/// Counts detected conflicts per label set.
#[derive(Debug, Default)]
pub struct ConflictMetrics {
    counters: DashMap<ConflictLabels, AtomicU64>,
}

impl ConflictMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for a conflict.
    pub fn record(&self, record: &ConflictRecord) {
        self.counters
            .entry(ConflictLabels::from(record))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for a label set
    #[must_use]
    pub fn get(&self, labels: &ConflictLabels) -> u64 {
        self.counters
            .get(labels)
            .map_or(0, |counter| counter.load(Ordering::Relaxed))
    }

    /// Sum across all label sets
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counters
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }

    /// Render in the Prometheus text exposition format, one line per series
    /// in label order.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let mut series: Vec<(ConflictLabels, u64)> = self
            .counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        series.sort();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "# HELP {CONFLICT_METRIC_NAME} Total number of verified conflicts"
        );
        let _ = writeln!(out, "# TYPE {CONFLICT_METRIC_NAME} counter");
        for (labels, value) in series {
            let _ = writeln!(
                out,
                "{CONFLICT_METRIC_NAME}{{url=\"{}\",hash=\"{}\",conflict_hash=\"{}\",last_modified=\"{}\",file_size=\"{}\"}} {value}",
                escape_label(&labels.url),
                escape_label(&labels.hash),
                escape_label(&labels.conflict_hash),
                escape_label(&labels.last_modified),
                labels.file_size,
            );
        }
        out
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
