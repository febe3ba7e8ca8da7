//! The preloader facade.

use super::builder::PreloaderBuilder;
use super::status::{LifecycleState, PreloaderStatus};
use crate::cache::{MessageStore, PageKey, PageStore};
use crate::config::PreloadConfig;
use crate::scheduler::{
    PendingSet, PreloadTask, SchedulerConfig, WorkerContext,
};
use crate::source::MessageSource;
use crate::stats::PreloadStats;
use crate::types::{Message, MessagePage};
use crate::{PreloadError, Result};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Predictive prefetch cache for a paginated remote message store.
///
/// Owned by the application and injected wherever preloading opportunities
/// surface; there is no global instance. All public operations are
/// non-blocking: constant-time locked cache work or a non-blocking enqueue
/// attempt. See the [module docs](super) for the caller contract.
pub struct Preloader {
    config: ArcSwap<PreloadConfig>,
    items: Arc<MessageStore>,
    pages: Arc<PageStore>,
    stats: Arc<PreloadStats>,
    pending: Arc<PendingSet>,
    workers: Arc<Semaphore>,
    shutting_down: Arc<AtomicBool>,
    tx: Mutex<Option<mpsc::Sender<PreloadTask>>>,
    state: AtomicU8,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl Preloader {
    /// Create a preloader with default configuration.
    pub fn new(source: Arc<dyn MessageSource>) -> Result<Self> {
        PreloaderBuilder::new().build(source)
    }

    /// Start configuring a preloader.
    pub fn builder() -> PreloaderBuilder {
        PreloaderBuilder::new()
    }

    pub(crate) fn start(
        source: Arc<dyn MessageSource>,
        config: PreloadConfig,
        scheduler: SchedulerConfig,
    ) -> Self {
        let per_cache = config.per_cache_budget_bytes();
        let items = Arc::new(MessageStore::new(per_cache));
        let pages = Arc::new(PageStore::new(per_cache));
        let stats = Arc::new(PreloadStats::new());
        let pending = Arc::new(PendingSet::new());
        let workers = Arc::new(Semaphore::new(config.background_workers));
        let shutting_down = Arc::new(AtomicBool::new(false));

        let (tx, rx) = mpsc::channel(scheduler.queue_capacity);
        let ctx = Arc::new(WorkerContext {
            source,
            items: Arc::clone(&items),
            pages: Arc::clone(&pages),
            stats: Arc::clone(&stats),
            pending: Arc::clone(&pending),
            shutting_down: Arc::clone(&shutting_down),
            task_timeout: scheduler.task_timeout,
            batch_concurrency: scheduler.batch_concurrency,
        });
        let dispatcher = crate::scheduler::spawn_dispatcher(
            rx,
            Arc::clone(&workers),
            scheduler.retry_capacity,
            ctx,
        );

        Self {
            config: ArcSwap::from_pointee(config),
            items,
            pages,
            stats,
            pending,
            workers,
            shutting_down,
            tx: Mutex::new(Some(tx)),
            state: AtomicU8::new(LifecycleState::Running.as_u8()),
            dispatcher: Mutex::new(Some(dispatcher)),
        }
    }

    fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Ask for the page after `page_token` to be fetched in the background.
    ///
    /// Returns `Ok` without enqueuing when the page is already cached or a
    /// fetch for it is already in flight; silently no-ops once shutdown has
    /// begun. Every error is advisory: the caller proceeds exactly as if it
    /// had never asked.
    pub fn preload_next_page(
        &self,
        page_token: &str,
        query: Option<&str>,
        max_results: u32,
    ) -> Result<()> {
        if self.state() != LifecycleState::Running {
            return Ok(());
        }
        let cfg = self.config.load();
        if !cfg.enabled || !cfg.next_page_enabled {
            return Err(PreloadError::Disabled);
        }
        if page_token.is_empty() {
            return Err(PreloadError::EmptyPageToken);
        }

        let key = PageKey::new(page_token, query);
        if self.pages.contains(&key) {
            return Ok(());
        }
        let task = PreloadTask::next_page(page_token, query, max_results);
        let claim = match task.pending_keys().pop() {
            Some(claim) => claim,
            None => return Ok(()),
        };
        if !self.pending.try_claim(claim) {
            // A fetch for this page is already queued or running.
            return Ok(());
        }
        self.stats.record_next_page_request();
        debug!(token = page_token, query = query.unwrap_or(""), "queueing next-page preload");
        self.submit(task)
    }

    /// Ask for the messages around `current_id` to be fetched in the
    /// background.
    ///
    /// The window is half of `adjacent_count` on each side of the current
    /// index, clamped to the list bounds; the current message, already-cached
    /// messages and messages already being fetched are excluded. An empty
    /// result after filtering is a successful no-op.
    pub fn preload_adjacent(&self, current_id: &str, ordered_ids: &[String]) -> Result<()> {
        if self.state() != LifecycleState::Running {
            return Ok(());
        }
        let cfg = self.config.load();
        if !cfg.enabled || !cfg.adjacent_enabled {
            return Err(PreloadError::Disabled);
        }
        let index = ordered_ids
            .iter()
            .position(|id| id == current_id)
            .ok_or_else(|| PreloadError::UnknownMessageId {
                id: current_id.to_string(),
            })?;

        let half = cfg.adjacent_count / 2;
        let start = index.saturating_sub(half);
        let end = (index + half).min(ordered_ids.len() - 1);

        let mut targets = Vec::new();
        for i in start..=end {
            if i == index {
                continue;
            }
            let id = &ordered_ids[i];
            if self.items.contains(id) {
                continue;
            }
            if !self.pending.try_claim(crate::scheduler::message_claim(id)) {
                continue;
            }
            targets.push(id.clone());
        }
        if targets.is_empty() {
            return Ok(());
        }
        self.stats.record_adjacent_request();
        debug!(current = current_id, count = targets.len(), "queueing adjacent preload");
        self.submit(PreloadTask::adjacent(targets))
    }

    fn submit(&self, task: PreloadTask) -> Result<()> {
        let guard = self.tx.lock().unwrap();
        let Some(tx) = guard.as_ref() else {
            drop(guard);
            self.release_claims(&task);
            return Ok(());
        };
        match tx.try_send(task) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(task)) => {
                drop(guard);
                self.release_claims(&task);
                Err(PreloadError::QueueFull)
            }
            Err(TrySendError::Closed(task)) => {
                drop(guard);
                self.release_claims(&task);
                Ok(())
            }
        }
    }

    fn release_claims(&self, task: &PreloadTask) {
        for key in task.pending_keys() {
            self.pending.release(&key);
        }
    }

    /// Synchronous page lookup. Counts a hit or a miss and refreshes the
    /// entry's recency on hit.
    pub fn cached_page(&self, key: &PageKey) -> Option<Arc<MessagePage>> {
        match self.pages.get(key) {
            Some(page) => {
                self.stats.record_hit();
                Some(page)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Synchronous message lookup. Counts a hit or a miss and refreshes the
    /// entry's recency on hit.
    pub fn cached_message(&self, id: &str) -> Option<Arc<Message>> {
        match self.items.get(id) {
            Some(message) => {
                self.stats.record_hit();
                Some(message)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Empty both caches and zero their byte counters. Always succeeds.
    pub fn clear_cache(&self) {
        self.items.clear();
        self.pages.clear();
        debug!("caches cleared");
    }

    /// Swap in a new configuration.
    ///
    /// Validation failures reject the whole update without mutating state.
    /// On success the config is visible to subsequent calls immediately; the
    /// worker pool is resized in place, and when the budget shrank below
    /// current usage an asynchronous sweep evicts down to the new budget.
    pub fn update_config(&self, config: PreloadConfig) -> Result<()> {
        config.validate()?;
        let old = self.config.load_full();
        let new = Arc::new(config);
        self.config.store(Arc::clone(&new));

        if new.background_workers > old.background_workers {
            self.workers
                .add_permits(new.background_workers - old.background_workers);
        } else if new.background_workers < old.background_workers {
            let delta = old.background_workers - new.background_workers;
            let workers = Arc::clone(&self.workers);
            tokio::spawn(async move {
                for _ in 0..delta {
                    if let Ok(permit) = Arc::clone(&workers).acquire_owned().await {
                        permit.forget();
                    }
                }
            });
        }

        let per_cache = new.per_cache_budget_bytes();
        self.items.set_budget(per_cache);
        self.pages.set_budget(per_cache);
        if per_cache < old.per_cache_budget_bytes() {
            let items = Arc::clone(&self.items);
            let pages = Arc::clone(&self.pages);
            tokio::spawn(async move {
                items.shrink_to(per_cache);
                pages.shrink_to(per_cache);
                debug!(budget_bytes = per_cache, "eviction sweep finished");
            });
        }

        info!(
            workers = new.background_workers,
            cache_mb = new.cache_size_mb,
            enabled = new.enabled,
            "configuration updated"
        );
        Ok(())
    }

    /// Current configuration (cheap atomic read).
    pub fn config(&self) -> PreloadConfig {
        (**self.config.load()).clone()
    }

    /// Snapshot lifecycle, config, cache occupancy and statistics.
    pub fn status(&self) -> PreloaderStatus {
        PreloaderStatus {
            state: self.state(),
            config: self.config(),
            item_cache: self.items.occupancy(),
            page_cache: self.pages.occupancy(),
            stats: self.stats.snapshot(),
        }
    }

    /// Stop accepting preload work and release cached memory.
    ///
    /// Idempotent: only the first call has any effect. In-flight workers are
    /// not cancelled; a late write into the just-cleared caches is a bounded,
    /// harmless race (the entry simply re-enters within budget).
    pub fn shutdown(&self) {
        let from = LifecycleState::Running.as_u8();
        let to = LifecycleState::ShuttingDown.as_u8();
        if self
            .state
            .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.shutting_down.store(true, Ordering::SeqCst);
        // Dropping the sender closes the queue; the dispatcher drains,
        // discards, and exits.
        self.tx.lock().unwrap().take();
        self.items.clear();
        self.pages.clear();
        self.state
            .store(LifecycleState::Stopped.as_u8(), Ordering::SeqCst);
        info!("preloader shut down");
    }

    /// Wait for the dispatcher task to exit. Test and teardown helper; call
    /// after [`Preloader::shutdown`].
    pub async fn join(&self) {
        let handle = self.dispatcher.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader")
            .field("state", &self.state())
            .field("items", &self.items.occupancy().entries)
            .field("pages", &self.pages.occupancy().entries)
            .finish()
    }
}
