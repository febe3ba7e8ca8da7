//! Preloader configuration.
//!
//! All knobs live in [`PreloadConfig`]. The struct is cheap to clone and is
//! swapped atomically at runtime via [`Preloader::update_config`], so hot-path
//! reads never see a torn configuration.
//!
//! Three of the knobs are advisory: `next_page_threshold`,
//! `next_page_max_pages` and `api_quota_reserve_percent` are validated, stored
//! and reported back through the status snapshot, but the preloader itself
//! cannot observe scroll position, pagination depth or quota spend, so
//! enforcing them is the caller's job.
//!
//! [`Preloader::update_config`]: crate::preloader::Preloader::update_config

use crate::{PreloadError, Result};
use serde::{Deserialize, Serialize};

/// Minimum size of the background worker pool.
pub const MIN_WORKERS: usize = 1;
/// Maximum size of the background worker pool.
pub const MAX_WORKERS: usize = 15;
/// Maximum total cache budget in megabytes.
pub const MAX_CACHE_MB: usize = 500;

/// Runtime configuration for the preloader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Master switch; when false every preload trigger returns `Disabled`.
    pub enabled: bool,
    /// Enable speculative next-page fetches.
    pub next_page_enabled: bool,
    /// Fraction of the current page the caller should consume before
    /// triggering a next-page preload. Advisory.
    pub next_page_threshold: f64,
    /// How many pages ahead callers should at most chain. Advisory.
    pub next_page_max_pages: u32,
    /// Enable speculative fetches of messages near the current selection.
    pub adjacent_enabled: bool,
    /// Width of the adjacency window; half of it is applied on each side of
    /// the current index.
    pub adjacent_count: usize,
    /// Fixed size of the background worker pool.
    pub background_workers: usize,
    /// Total memory budget across both caches, in megabytes.
    pub cache_size_mb: usize,
    /// Fraction of API quota callers should keep free for user-initiated
    /// requests. Advisory; never enforced here.
    pub api_quota_reserve_percent: u8,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            next_page_enabled: true,
            next_page_threshold: 0.7,
            next_page_max_pages: 5,
            adjacent_enabled: true,
            adjacent_count: 3,
            background_workers: 3,
            cache_size_mb: 50,
            api_quota_reserve_percent: 20,
        }
    }
}

impl PreloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_next_page_enabled(mut self, enabled: bool) -> Self {
        self.next_page_enabled = enabled;
        self
    }

    pub fn with_adjacent_enabled(mut self, enabled: bool) -> Self {
        self.adjacent_enabled = enabled;
        self
    }

    pub fn with_adjacent_count(mut self, count: usize) -> Self {
        self.adjacent_count = count;
        self
    }

    pub fn with_background_workers(mut self, workers: usize) -> Self {
        self.background_workers = workers;
        self
    }

    pub fn with_cache_size_mb(mut self, mb: usize) -> Self {
        self.cache_size_mb = mb;
        self
    }

    /// Check every field against its documented bounds.
    ///
    /// Returns the first violation; the config is not partially applied on
    /// failure anywhere in the crate.
    pub fn validate(&self) -> Result<()> {
        if self.background_workers < MIN_WORKERS || self.background_workers > MAX_WORKERS {
            return Err(PreloadError::invalid_config(
                "background_workers",
                format!(
                    "{} is outside [{}, {}]",
                    self.background_workers, MIN_WORKERS, MAX_WORKERS
                ),
            ));
        }
        if self.cache_size_mb == 0 || self.cache_size_mb > MAX_CACHE_MB {
            return Err(PreloadError::invalid_config(
                "cache_size_mb",
                format!("{} is outside (0, {}]", self.cache_size_mb, MAX_CACHE_MB),
            ));
        }
        if !self.next_page_threshold.is_finite()
            || self.next_page_threshold <= 0.0
            || self.next_page_threshold > 1.0
        {
            return Err(PreloadError::invalid_config(
                "next_page_threshold",
                format!("{} is outside (0, 1]", self.next_page_threshold),
            ));
        }
        if self.next_page_max_pages == 0 {
            return Err(PreloadError::invalid_config(
                "next_page_max_pages",
                "must be at least 1",
            ));
        }
        if self.adjacent_count == 0 {
            return Err(PreloadError::invalid_config(
                "adjacent_count",
                "must be at least 1",
            ));
        }
        if self.api_quota_reserve_percent > 100 {
            return Err(PreloadError::invalid_config(
                "api_quota_reserve_percent",
                format!("{} exceeds 100", self.api_quota_reserve_percent),
            ));
        }
        Ok(())
    }

    /// Total configured budget in bytes.
    pub fn cache_budget_bytes(&self) -> usize {
        self.cache_size_mb * 1024 * 1024
    }

    /// Budget for one of the two caches. The item cache and the page cache are
    /// independent maps; each gets half of the configured total so combined
    /// usage stays within `cache_size_mb`.
    pub fn per_cache_budget_bytes(&self) -> usize {
        self.cache_budget_bytes() / 2
    }
}
