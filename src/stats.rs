//! Preload statistics.
//!
//! Counters are incremented on every lookup and every completed background
//! load, but read only when a status snapshot is requested, so they are plain
//! relaxed atomics rather than a locked struct.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Monotonic counters owned by the preloader.
#[derive(Debug, Default)]
pub(crate) struct PreloadStats {
    next_page_requests: AtomicU64,
    adjacent_requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    bytes_loaded: AtomicU64,
    loads: AtomicU64,
    load_time_ms: AtomicU64,
}

impl PreloadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_next_page_request(&self) {
        self.next_page_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_adjacent_request(&self) {
        self.adjacent_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed background load: volume and latency only.
    /// Hit/miss counters are never touched from worker context.
    pub fn record_load(&self, bytes: usize, elapsed: Duration) {
        self.bytes_loaded.fetch_add(bytes as u64, Ordering::Relaxed);
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.load_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            next_page_requests: self.next_page_requests.load(Ordering::Relaxed),
            adjacent_requests: self.adjacent_requests.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bytes_loaded: self.bytes_loaded.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_time_ms: self.load_time_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters, plus derived ratios.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub next_page_requests: u64,
    pub adjacent_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub bytes_loaded: u64,
    pub loads: u64,
    pub load_time_ms: u64,
}

impl StatsSnapshot {
    /// `hits / (hits + misses)`, 0.0 when nothing has been looked up yet.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Average background load latency in milliseconds, 0.0 before any load.
    pub fn avg_load_ms(&self) -> f64 {
        if self.loads == 0 {
            0.0
        } else {
            self.load_time_ms as f64 / self.loads as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_zero_guard() {
        let stats = PreloadStats::new();
        assert_eq!(stats.snapshot().hit_ratio(), 0.0);
    }

    #[test]
    fn test_hit_ratio() {
        let stats = PreloadStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        let snap = stats.snapshot();
        assert_eq!(snap.hits, 3);
        assert_eq!(snap.misses, 1);
        assert!((snap.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_accounting() {
        let stats = PreloadStats::new();
        stats.record_load(1024, Duration::from_millis(40));
        stats.record_load(2048, Duration::from_millis(60));
        let snap = stats.snapshot();
        assert_eq!(snap.bytes_loaded, 3072);
        assert_eq!(snap.loads, 2);
        assert!((snap.avg_load_ms() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_avg_load_zero_guard() {
        assert_eq!(StatsSnapshot::default().avg_load_ms(), 0.0);
    }

    #[test]
    fn test_request_counters() {
        let stats = PreloadStats::new();
        stats.record_next_page_request();
        stats.record_adjacent_request();
        stats.record_adjacent_request();
        let snap = stats.snapshot();
        assert_eq!(snap.next_page_requests, 1);
        assert_eq!(snap.adjacent_requests, 2);
    }
}
