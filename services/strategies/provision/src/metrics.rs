//! Provisioning metrics collection

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of strategy counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrategyMetrics {
    pub positions_opened: u64,
    pub positions_closed: u64,
    pub swaps_issued: u64,
    pub failures: u64,
}

/// Thread-safe metrics collector for strategies
#[derive(Debug)]
pub struct MetricsCollector {
    positions_opened: AtomicU64,
    positions_closed: AtomicU64,
    swaps_issued: AtomicU64,
    failures: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            positions_opened: AtomicU64::new(0),
            positions_closed: AtomicU64::new(0),
            swaps_issued: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn increment_opened(&self) {
        self.positions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_closed(&self) {
        self.positions_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_swaps(&self) {
        self.swaps_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> StrategyMetrics {
        StrategyMetrics {
            positions_opened: self.positions_opened.load(Ordering::Relaxed),
            positions_closed: self.positions_closed.load(Ordering::Relaxed),
            swaps_issued: self.swaps_issued.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let collector = MetricsCollector::new();
        collector.increment_opened();
        collector.increment_opened();
        collector.increment_swaps();
        collector.increment_closed();
        collector.increment_failures();

        assert_eq!(
            collector.get_metrics(),
            StrategyMetrics {
                positions_opened: 2,
                positions_closed: 1,
                swaps_issued: 1,
                failures: 1,
            }
        );
    }
}
