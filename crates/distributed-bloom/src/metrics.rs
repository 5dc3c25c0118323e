//! Metrics hooks for distributed filter operations
//!
//! Counts client-side activity only. Nothing here feeds back into membership
//! answers: the remote store is the single source of truth for bits.
//!
//! ## Usage
//!
//! ```ignore
//! use distributed_bloom::metrics::Metrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let filter = DistributedBloomFilter::<str, _, _>::new_with_metrics(
//!     store,
//!     identity,
//!     config,
//!     StringFunnel,
//!     metrics.clone(),
//! )
//! .await?;
//!
//! filter.put("apple").await?;
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters for filter operations
#[derive(Default)]
pub struct Metrics {
    /// Filters constructed (and allocated)
    pub filters_created: AtomicU64,
    /// Completed `put` calls
    pub inserts_performed: AtomicU64,
    /// `put` calls that flipped at least one bit
    pub inserts_changed: AtomicU64,
    /// Completed `might_contain` calls
    pub lookups_performed: AtomicU64,
    /// Lookups answering "might contain"
    pub lookups_positive: AtomicU64,
    /// Operations aborted by a store failure
    pub store_errors: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_filter_created(&self) {
        self.filters_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert(&self, duration: Duration, changed: bool) {
        self.inserts_performed.fetch_add(1, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if changed {
            self.inserts_changed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// `found` includes false positives
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            inserts_performed: self.inserts_performed.load(Ordering::Relaxed),
            inserts_changed: self.inserts_changed.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            avg_lookup_ns: average(&self.lookup_time_ns, &self.lookups_performed),
            avg_insert_ns: average(&self.insert_time_ns, &self.inserts_performed),
        }
    }

    /// Ratio of positive lookups to total lookups (true and false positives)
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.filters_created.store(0, Ordering::Relaxed);
        self.inserts_performed.store(0, Ordering::Relaxed);
        self.inserts_changed.store(0, Ordering::Relaxed);
        self.lookups_performed.store(0, Ordering::Relaxed);
        self.lookups_positive.store(0, Ordering::Relaxed);
        self.store_errors.store(0, Ordering::Relaxed);
        self.lookup_time_ns.store(0, Ordering::Relaxed);
        self.insert_time_ns.store(0, Ordering::Relaxed);
    }
}

fn average(total: &AtomicU64, count: &AtomicU64) -> u64 {
    let count = count.load(Ordering::Relaxed);
    if count > 0 {
        total.load(Ordering::Relaxed) / count
    } else {
        0
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub inserts_performed: u64,
    pub inserts_changed: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub store_errors: u64,
    pub avg_lookup_ns: u64,
    pub avg_insert_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this to forward filter activity to Prometheus, StatsD, etc.
pub trait MetricsRecorder: Send + Sync {
    fn record_filter_created(&self);

    fn record_insert(&self, duration: Duration, changed: bool);

    fn record_lookup(&self, duration: Duration, found: bool);

    fn record_store_error(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_created(&self) {}
    fn record_insert(&self, _: Duration, _: bool) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_store_error(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_created(&self) {
        Metrics::record_filter_created(self);
    }

    fn record_insert(&self, duration: Duration, changed: bool) {
        Metrics::record_insert(self, duration, changed);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        Metrics::record_lookup(self, duration, found);
    }

    fn record_store_error(&self) {
        Metrics::record_store_error(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let snapshot = Metrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_record_inserts() {
        let metrics = Metrics::new();

        metrics.record_insert(Duration::from_nanos(100), true);
        metrics.record_insert(Duration::from_nanos(300), false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.inserts_performed, 2);
        assert_eq!(snapshot.inserts_changed, 1);
        assert_eq!(snapshot.avg_insert_ns, 200);
    }

    #[test]
    fn test_record_lookups() {
        let metrics = Metrics::new();

        metrics.record_lookup(Duration::from_nanos(100), true);
        metrics.record_lookup(Duration::from_nanos(150), false);
        metrics.record_lookup(Duration::from_nanos(120), true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lookups_performed, 3);
        assert_eq!(snapshot.lookups_positive, 2);
        assert_eq!(snapshot.avg_lookup_ns, 123); // (100 + 150 + 120) / 3
    }

    #[test]
    fn test_observed_positive_rate() {
        let metrics = Metrics::new();

        for _ in 0..100 {
            metrics.record_lookup(Duration::from_nanos(100), false);
        }
        for _ in 0..10 {
            metrics.record_lookup(Duration::from_nanos(100), true);
        }

        let rate = metrics.observed_positive_rate();
        assert!((rate - 0.0909).abs() < 0.01); // 10/110
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();

        metrics.record_filter_created();
        metrics.record_lookup(Duration::from_nanos(100), true);
        metrics.record_store_error();

        metrics.reset();

        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_noop_metrics() {
        let metrics = NoOpMetrics;
        metrics.record_filter_created();
        metrics.record_insert(Duration::from_nanos(100), true);
        metrics.record_lookup(Duration::from_nanos(100), true);
        metrics.record_store_error();
    }
}
