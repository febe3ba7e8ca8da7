//! Dispatcher loop and worker execution.

use super::pending::PendingSet;
use super::task::{PreloadTask, TaskPayload, TaskPriority};
use crate::cache::{MessageStore, PageKey, PageStore};
use crate::source::MessageSource;
use crate::stats::PreloadStats;
use crate::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Tunables for the queue and worker pool.
#[derive(Debug, Clone)]
pub(crate) struct SchedulerConfig {
    /// Submission queue capacity; `try_send` past this reports queue-full.
    pub queue_capacity: usize,
    /// High-priority retry buffer capacity.
    pub retry_capacity: usize,
    /// Default per-task fetch timeout.
    pub task_timeout: Duration,
    /// Parallelism hint passed to `MessageSource::fetch_batch`.
    pub batch_concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            retry_capacity: 16,
            task_timeout: Duration::from_secs(30),
            batch_concurrency: 4,
        }
    }
}

/// Everything a worker needs, shared behind one `Arc`.
pub(crate) struct WorkerContext {
    pub source: Arc<dyn MessageSource>,
    pub items: Arc<MessageStore>,
    pub pages: Arc<PageStore>,
    pub stats: Arc<PreloadStats>,
    pub pending: Arc<PendingSet>,
    pub shutting_down: Arc<AtomicBool>,
    pub task_timeout: Duration,
    pub batch_concurrency: usize,
}

fn release_claims(ctx: &WorkerContext, task: &PreloadTask) {
    for key in task.pending_keys() {
        ctx.pending.release(&key);
    }
}

/// Run the dispatcher until the submission channel closes.
///
/// Tasks are pulled in FIFO arrival order. A worker permit is acquired
/// without blocking; when none is free, High tasks wait in the bounded retry
/// buffer and Normal tasks are dropped. While the buffer is non-empty the
/// loop also waits on a freed permit so buffered tasks run as soon as
/// capacity returns.
pub(crate) fn spawn_dispatcher(
    mut rx: mpsc::Receiver<PreloadTask>,
    workers: Arc<Semaphore>,
    retry_capacity: usize,
    ctx: Arc<WorkerContext>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut retry: VecDeque<PreloadTask> = VecDeque::new();
        loop {
            let task = if retry.is_empty() {
                match rx.recv().await {
                    Some(task) => task,
                    None => break,
                }
            } else {
                tokio::select! {
                    biased;
                    permit = workers.clone().acquire_owned() => {
                        match permit {
                            Ok(permit) => {
                                if let Some(task) = retry.pop_front() {
                                    spawn_worker(permit, task, &ctx);
                                }
                                continue;
                            }
                            Err(_) => break,
                        }
                    }
                    maybe = rx.recv() => match maybe {
                        Some(task) => task,
                        None => break,
                    },
                }
            };

            if ctx.shutting_down.load(Ordering::SeqCst) {
                release_claims(&ctx, &task);
                continue;
            }

            match workers.clone().try_acquire_owned() {
                Ok(permit) => spawn_worker(permit, task, &ctx),
                Err(TryAcquireError::Closed) => break,
                Err(TryAcquireError::NoPermits) => match task.priority {
                    TaskPriority::High if retry.len() < retry_capacity => retry.push_back(task),
                    TaskPriority::High => {
                        debug!(task = %task.id, "retry buffer full; dropping adjacent preload");
                        release_claims(&ctx, &task);
                    }
                    TaskPriority::Normal => {
                        debug!(task = %task.id, "workers busy; dropping next-page preload");
                        release_claims(&ctx, &task);
                    }
                },
            }
        }

        for task in retry {
            release_claims(&ctx, &task);
        }
        debug!("dispatcher stopped");
    })
}

fn spawn_worker(permit: OwnedSemaphorePermit, task: PreloadTask, ctx: &Arc<WorkerContext>) {
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let _permit = permit;
        run_task(task, &ctx).await;
    });
}

/// Execute one task end to end: derive the timeout, fetch, fill the cache,
/// record load volume and latency. Fetch failures are logged and discarded;
/// nothing here surfaces to any caller. Hit/miss counters are untouched.
async fn run_task(task: PreloadTask, ctx: &WorkerContext) {
    let Some(timeout) = task.remaining_timeout(ctx.task_timeout) else {
        debug!(task = %task.id, "deadline expired before execution; skipping");
        release_claims(ctx, &task);
        return;
    };

    let start = Instant::now();
    match tokio::time::timeout(timeout, execute(&task, ctx)).await {
        Ok(Ok(bytes)) => {
            ctx.stats.record_load(bytes, start.elapsed());
            debug!(
                task = %task.id,
                bytes,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "preload task completed"
            );
        }
        Ok(Err(err)) => {
            warn!(task = %task.id, error = %err, "preload task failed");
        }
        Err(_) => {
            warn!(
                task = %task.id,
                timeout_ms = timeout.as_millis() as u64,
                "preload task timed out"
            );
        }
    }
    release_claims(ctx, &task);
}

async fn execute(task: &PreloadTask, ctx: &WorkerContext) -> Result<usize> {
    match &task.payload {
        TaskPayload::NextPage {
            page_token,
            query,
            max_results,
        } => {
            let page = match query {
                Some(q) => {
                    ctx.source
                        .search_page(q, *max_results, page_token)
                        .await?
                }
                None => ctx.source.list_page(*max_results, page_token).await?,
            };
            let key = PageKey::new(page_token.clone(), query.as_deref());
            Ok(ctx.pages.insert(key, page))
        }
        TaskPayload::Adjacent { ids } => {
            let concurrency = ctx.batch_concurrency.min(ids.len()).max(1);
            let messages = ctx.source.fetch_batch(ids, concurrency).await?;
            Ok(messages
                .into_iter()
                .map(|message| ctx.items.insert(message))
                .sum())
        }
    }
}
