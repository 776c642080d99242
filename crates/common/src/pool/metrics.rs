//! Pool metrics tracking
//!
//! Atomic counters updated on every checkout and every release so a pool can
//! report its traffic without taking locks.

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::PoolMetricsSnapshot;

/// Connection pool metrics tracker
#[derive(Debug)]
pub struct PoolMetrics {
    /// Connections successfully borrowed from the pool
    pub connections_acquired: AtomicU64,

    /// Connections handed back to the idle set
    pub connections_returned: AtomicU64,

    /// Connections discarded because they broke mid-operation
    pub connections_discarded: AtomicU64,

    /// Checkouts that failed (timeout, refused endpoint, closed pool)
    pub checkout_errors: AtomicU64,

    /// Total time spent acquiring connections (in milliseconds)
    total_acquire_time_ms: AtomicU64,

    max_pool_size: u32,
}

impl PoolMetrics {
    /// Create a new metrics tracker
    pub fn new(max_pool_size: u32) -> Self {
        Self {
            connections_acquired: AtomicU64::new(0),
            connections_returned: AtomicU64::new(0),
            connections_discarded: AtomicU64::new(0),
            checkout_errors: AtomicU64::new(0),
            total_acquire_time_ms: AtomicU64::new(0),
            max_pool_size,
        }
    }

    /// Record a successful checkout
    pub fn record_acquired(&self, duration_ms: u64) {
        self.connections_acquired.fetch_add(1, Ordering::Relaxed);
        self.total_acquire_time_ms.fetch_add(duration_ms, Ordering::Relaxed);
    }

    /// Record a healthy connection going back to the pool
    pub fn record_returned(&self) {
        self.connections_returned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a broken connection being dropped
    pub fn record_discarded(&self) {
        self.connections_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed checkout
    pub fn record_checkout_error(&self) {
        self.checkout_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get average checkout time in milliseconds
    pub fn avg_acquire_time_ms(&self) -> u64 {
        let total = self.total_acquire_time_ms.load(Ordering::Relaxed);
        let count = self.connections_acquired.load(Ordering::Relaxed);

        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Get the maximum pool size
    pub fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }

    /// Take a point-in-time copy of every counter
    pub fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            connections_acquired: self.connections_acquired.load(Ordering::Relaxed),
            connections_returned: self.connections_returned.load(Ordering::Relaxed),
            connections_discarded: self.connections_discarded.load(Ordering::Relaxed),
            checkout_errors: self.checkout_errors.load(Ordering::Relaxed),
            avg_acquire_time_ms: self.avg_acquire_time_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for pool::metrics.
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = PoolMetrics::new(8);

        assert_eq!(metrics.max_pool_size(), 8);
        assert_eq!(metrics.snapshot(), PoolMetricsSnapshot::default());
    }

    /// Validates the average checkout time calculation.
    ///
    /// Assertions:
    /// - Confirms the average is total time divided by checkouts.
    #[test]
    fn test_avg_acquire_time() {
        let metrics = PoolMetrics::new(8);
        metrics.record_acquired(10);
        metrics.record_acquired(30);

        assert_eq!(metrics.avg_acquire_time_ms(), 20);
    }

    #[test]
    fn test_release_counters() {
        let metrics = PoolMetrics::new(8);
        metrics.record_returned();
        metrics.record_discarded();
        metrics.record_discarded();
        metrics.record_checkout_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections_returned, 1);
        assert_eq!(snapshot.connections_discarded, 2);
        assert_eq!(snapshot.checkout_errors, 1);
    }
}
