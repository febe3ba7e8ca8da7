//! In-flight preload tracking.

use crate::cache::PageKey;
use std::collections::HashSet;
use std::sync::Mutex;

/// Claim label for a page preload.
pub(crate) fn page_claim(key: &PageKey) -> String {
    format!("page/{}", key)
}

/// Claim label for a single-message preload.
pub(crate) fn message_claim(id: &str) -> String {
    format!("msg/{}", id)
}

/// Set of claims for work that is queued or executing.
///
/// A claim is taken before a task is submitted and released when the task
/// finishes or is dropped, so a second preload of the same page or message
/// while the first is still in flight becomes a no-op instead of a duplicate
/// fetch.
#[derive(Debug, Default)]
pub(crate) struct PendingSet {
    inner: Mutex<HashSet<String>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a key. Returns false when it is already claimed.
    pub fn try_claim(&self, key: String) -> bool {
        self.inner.lock().unwrap().insert(key)
    }

    pub fn release(&self, key: &str) {
        self.inner.lock().unwrap().remove(key);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}
