//! Preloader construction.

use super::core::Preloader;
use crate::config::PreloadConfig;
use crate::scheduler::SchedulerConfig;
use crate::source::MessageSource;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for a [`Preloader`] with custom configuration.
///
/// Keep this surface area small and predictable; everything has a sensible
/// default and only the source is required.
pub struct PreloaderBuilder {
    config: PreloadConfig,
    scheduler: SchedulerConfig,
}

impl PreloaderBuilder {
    pub fn new() -> Self {
        Self {
            config: PreloadConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    /// Replace the whole configuration; validated at build time.
    pub fn with_config(mut self, config: PreloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Submission queue capacity (default 100).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.scheduler.queue_capacity = capacity.max(1);
        self
    }

    /// High-priority retry buffer capacity (default 16).
    pub fn retry_capacity(mut self, capacity: usize) -> Self {
        self.scheduler.retry_capacity = capacity;
        self
    }

    /// Per-task fetch timeout (default 30 s).
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.scheduler.task_timeout = timeout;
        self
    }

    /// Parallelism hint handed to `MessageSource::fetch_batch` (default 4).
    pub fn batch_concurrency(mut self, concurrency: usize) -> Self {
        self.scheduler.batch_concurrency = concurrency.max(1);
        self
    }

    /// Validate the configuration, wire up the caches and worker pool, and
    /// spawn the dispatcher. Must be called inside a tokio runtime; the
    /// returned preloader keeps using that runtime for its background work.
    pub fn build(self, source: Arc<dyn MessageSource>) -> Result<Preloader> {
        self.config.validate()?;
        Ok(Preloader::start(source, self.config, self.scheduler))
    }
}

impl Default for PreloaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
