//! Preload task definitions.

use crate::cache::PageKey;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Dispatch priority under worker contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPriority {
    /// Adjacent-item prefetch; buffered for retry when workers are busy.
    High,
    /// Next-page prefetch; dropped outright when workers are busy.
    Normal,
}

/// What a task fetches.
#[derive(Debug, Clone)]
pub enum TaskPayload {
    NextPage {
        page_token: String,
        query: Option<String>,
        max_results: u32,
    },
    Adjacent {
        ids: Vec<String>,
    },
}

/// A unit of background work, consumed exactly once by a worker.
#[derive(Debug)]
pub struct PreloadTask {
    pub id: Uuid,
    pub payload: TaskPayload,
    pub priority: TaskPriority,
    pub created_at: Instant,
    /// Optional absolute deadline inherited from the caller; the worker's
    /// fetch timeout never extends past it.
    pub deadline: Option<Instant>,
}

impl PreloadTask {
    pub fn next_page(page_token: impl Into<String>, query: Option<&str>, max_results: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: TaskPayload::NextPage {
                page_token: page_token.into(),
                query: query.map(|q| q.to_string()),
                max_results,
            },
            priority: TaskPriority::Normal,
            created_at: Instant::now(),
            deadline: None,
        }
    }

    pub fn adjacent(ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: TaskPayload::Adjacent { ids },
            priority: TaskPriority::High,
            created_at: Instant::now(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fetch timeout for this task: the default, shortened by the deadline.
    /// `None` when the deadline already passed and the fetch should not be
    /// attempted.
    pub(crate) fn remaining_timeout(&self, default: Duration) -> Option<Duration> {
        match self.deadline {
            None => Some(default),
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    None
                } else {
                    Some(default.min(deadline - now))
                }
            }
        }
    }

    /// Pending-set claims this task holds; released when the task finishes
    /// or is dropped without executing.
    pub(crate) fn pending_keys(&self) -> Vec<String> {
        match &self.payload {
            TaskPayload::NextPage {
                page_token, query, ..
            } => {
                let key = PageKey::new(page_token.clone(), query.as_deref());
                vec![super::pending::page_claim(&key)]
            }
            TaskPayload::Adjacent { ids } => {
                ids.iter().map(|id| super::pending::message_claim(id)).collect()
            }
        }
    }
}
