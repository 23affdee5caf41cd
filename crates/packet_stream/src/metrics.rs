//! Stream metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single stream
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// Total packets handed to the replica set
    packets_dispatched: AtomicU64,
    /// Total payload bytes handed to the replica set
    bytes_dispatched: AtomicU64,
    /// Total successful flushes
    flush_count: AtomicU64,
}

impl StreamMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total dispatched packet count
    pub fn packets_dispatched(&self) -> u64 {
        self.packets_dispatched.load(Ordering::Relaxed)
    }

    /// Get total dispatched byte count
    pub fn bytes_dispatched(&self) -> u64 {
        self.bytes_dispatched.load(Ordering::Relaxed)
    }

    /// Get flush count
    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub(crate) fn record_dispatch(&self, bytes: usize) {
        self.packets_dispatched.fetch_add(1, Ordering::Relaxed);
        self.bytes_dispatched.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn inc_flush_count(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters (for reporting)
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_dispatched: self.packets_dispatched(),
            bytes_dispatched: self.bytes_dispatched(),
            flush_count: self.flush_count(),
        }
    }
}

/// Snapshot of stream metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packets_dispatched: u64,
    pub bytes_dispatched: u64,
    pub flush_count: u64,
}
