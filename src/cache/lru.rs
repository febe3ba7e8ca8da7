//! Byte-budgeted LRU map.

use lru::LruCache;
use std::hash::Hash;
use std::time::Instant;
use tracing::trace;

/// One cached entry plus its accounting data.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub value: V,
    pub size: usize,
    pub created_at: Instant,
}

/// An LRU map bounded by total estimated bytes rather than entry count.
///
/// Recency is the position in the underlying [`LruCache`] list: `get` moves
/// an entry to the front, `pop_lru` removes the oldest. Not thread-safe on its
/// own; the stores wrap it in a `Mutex`.
pub(crate) struct BoundedLru<K: Hash + Eq, V> {
    entries: LruCache<K, Entry<V>>,
    budget: usize,
    max_entry_size: usize,
    current_bytes: usize,
}

impl<K: Hash + Eq, V> BoundedLru<K, V> {
    pub fn new(budget: usize, max_entry_size: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            budget,
            max_entry_size,
            current_bytes: 0,
        }
    }

    /// Look up a key, refreshing its recency on hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Whether the key is present. Does not touch recency.
    pub fn contains(&mut self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Insert a value with its estimated size, evicting LRU entries first so
    /// the byte budget holds afterwards.
    ///
    /// Sizes are clamped to the per-entry cap; the clamped figure is what gets
    /// accounted, even when the true payload is larger. Returns the number of
    /// bytes accounted, or 0 when nothing was inserted: the key was already
    /// present (idempotent insert, first value wins) or the clamped size alone
    /// exceeds the whole budget.
    pub fn insert(&mut self, key: K, value: V, size: usize) -> usize {
        let size = size.min(self.max_entry_size);
        if size > self.budget {
            return 0;
        }
        if self.entries.contains(&key) {
            return 0;
        }
        while self.current_bytes + size > self.budget {
            match self.entries.pop_lru() {
                Some((_, evicted)) => {
                    trace!(
                        bytes = evicted.size,
                        age_ms = evicted.created_at.elapsed().as_millis() as u64,
                        "evicted LRU entry for incoming insert"
                    );
                    self.current_bytes -= evicted.size;
                }
                None => break,
            }
        }
        self.current_bytes += size;
        self.entries.put(
            key,
            Entry {
                value,
                size,
                created_at: Instant::now(),
            },
        );
        size
    }

    /// Evict LRU entries until usage fits under `budget`, then adopt it.
    pub fn shrink_to(&mut self, budget: usize) {
        self.budget = budget;
        while self.current_bytes > self.budget {
            match self.entries.pop_lru() {
                Some((_, evicted)) => {
                    trace!(
                        bytes = evicted.size,
                        age_ms = evicted.created_at.elapsed().as_millis() as u64,
                        "evicted LRU entry during budget sweep"
                    );
                    self.current_bytes -= evicted.size;
                }
                None => break,
            }
        }
    }

    /// Adopt a new budget without evicting; pair with a later [`Self::shrink_to`]
    /// sweep when the budget went down.
    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn current_bytes(&self) -> usize {
        self.current_bytes
    }

    pub fn budget(&self) -> usize {
        self.budget
    }
}
