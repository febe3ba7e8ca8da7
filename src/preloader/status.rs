//! Status snapshot.

use crate::cache::CacheOccupancy;
use crate::config::PreloadConfig;
use crate::stats::StatsSnapshot;

/// Facade lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    ShuttingDown,
    Stopped,
}

impl LifecycleState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            LifecycleState::Running => 0,
            LifecycleState::ShuttingDown => 1,
            LifecycleState::Stopped => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Running,
            1 => LifecycleState::ShuttingDown,
            _ => LifecycleState::Stopped,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting-down",
            LifecycleState::Stopped => "stopped",
        };
        write!(f, "{}", label)
    }
}

/// Point-in-time view of the whole preloader: lifecycle, configuration,
/// cache occupancy and counters. Each piece is captured under its own lock.
#[derive(Debug, Clone)]
pub struct PreloaderStatus {
    pub state: LifecycleState,
    pub config: PreloadConfig,
    pub item_cache: CacheOccupancy,
    pub page_cache: CacheOccupancy,
    pub stats: StatsSnapshot,
}

impl PreloaderStatus {
    /// `hits / (hits + misses)`, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_ratio()
    }

    pub fn total_entries(&self) -> usize {
        self.item_cache.entries + self.page_cache.entries
    }

    pub fn total_bytes(&self) -> usize {
        self.item_cache.bytes + self.page_cache.bytes
    }
}
