//! Message and page stores.

use super::key::PageKey;
use super::lru::BoundedLru;
use super::size::{estimate_message_size, estimate_page_size, MAX_ITEM_BYTES};
use crate::types::{Message, MessagePage};
use std::sync::{Arc, Mutex};

/// Occupancy of one cache at a point in time.
#[derive(Debug, Clone, Default)]
pub struct CacheOccupancy {
    pub entries: usize,
    pub bytes: usize,
    pub budget_bytes: usize,
}

/// Byte-budgeted LRU of single messages, keyed by message id.
pub struct MessageStore {
    inner: Mutex<BoundedLru<String, Arc<Message>>>,
}

impl MessageStore {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(BoundedLru::new(budget_bytes, MAX_ITEM_BYTES)),
        }
    }

    /// Look up a message, refreshing its recency on hit.
    pub fn get(&self, id: &str) -> Option<Arc<Message>> {
        self.inner.lock().unwrap().get(&id.to_string()).cloned()
    }

    /// Presence check without touching recency; used to filter adjacency
    /// windows down to uncached ids.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().unwrap().contains(&id.to_string())
    }

    /// Insert a message under its own id. Returns the bytes accounted, 0 when
    /// the id was already present or the entry could not fit.
    pub fn insert(&self, message: Message) -> usize {
        let size = estimate_message_size(&message);
        self.inner
            .lock()
            .unwrap()
            .insert(message.id.clone(), Arc::new(message), size)
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn set_budget(&self, budget_bytes: usize) {
        self.inner.lock().unwrap().set_budget(budget_bytes);
    }

    /// Evict down to (and adopt) the given budget.
    pub fn shrink_to(&self, budget_bytes: usize) {
        self.inner.lock().unwrap().shrink_to(budget_bytes);
    }

    pub fn occupancy(&self) -> CacheOccupancy {
        let inner = self.inner.lock().unwrap();
        CacheOccupancy {
            entries: inner.len(),
            bytes: inner.current_bytes(),
            budget_bytes: inner.budget(),
        }
    }
}

/// Byte-budgeted LRU of pages, keyed by [`PageKey`].
pub struct PageStore {
    inner: Mutex<BoundedLru<PageKey, Arc<MessagePage>>>,
}

impl PageStore {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(BoundedLru::new(budget_bytes, MAX_ITEM_BYTES)),
        }
    }

    pub fn get(&self, key: &PageKey) -> Option<Arc<MessagePage>> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.inner.lock().unwrap().contains(key)
    }

    pub fn insert(&self, key: PageKey, page: MessagePage) -> usize {
        let size = estimate_page_size(&page);
        self.inner.lock().unwrap().insert(key, Arc::new(page), size)
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn set_budget(&self, budget_bytes: usize) {
        self.inner.lock().unwrap().set_budget(budget_bytes);
    }

    pub fn shrink_to(&self, budget_bytes: usize) {
        self.inner.lock().unwrap().shrink_to(budget_bytes);
    }

    pub fn occupancy(&self) -> CacheOccupancy {
        let inner = self.inner.lock().unwrap();
        CacheOccupancy {
            entries: inner.len(),
            bytes: inner.current_bytes(),
            budget_bytes: inner.budget(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessagePart;

    fn message(id: &str, body: &str) -> Message {
        Message::new(id).with_body(MessagePart::text(body))
    }

    #[test]
    fn test_message_store_round_trip() {
        let store = MessageStore::new(1024 * 1024);
        let accounted = store.insert(message("m1", "hello"));
        assert!(accounted > 0);
        let got = store.get("m1").unwrap();
        assert_eq!(got.id, "m1");
        assert!(store.contains("m1"));
        assert!(!store.contains("m2"));
    }

    #[test]
    fn test_message_store_idempotent_insert() {
        let store = MessageStore::new(1024 * 1024);
        let first = store.insert(message("m1", "original"));
        assert!(first > 0);
        assert_eq!(store.insert(message("m1", "replacement")), 0);
        let got = store.get("m1").unwrap();
        assert_eq!(got.body.body, bytes::Bytes::from("original"));
        assert_eq!(store.occupancy().entries, 1);
    }

    #[test]
    fn test_message_store_clear_zeroes_bytes() {
        let store = MessageStore::new(1024 * 1024);
        store.insert(message("m1", "hello"));
        store.insert(message("m2", "world"));
        store.clear();
        let occ = store.occupancy();
        assert_eq!(occ.entries, 0);
        assert_eq!(occ.bytes, 0);
        assert!(store.get("m1").is_none());
    }

    #[test]
    fn test_page_store_round_trip() {
        let store = PageStore::new(1024 * 1024);
        let page = MessagePage::new(vec![message("a", "x")], Some("next".into()));
        let key = PageKey::listing("tok");
        assert!(store.insert(key.clone(), page) > 0);
        let got = store.get(&key).unwrap();
        assert_eq!(got.messages.len(), 1);
        assert_eq!(got.next_page_token.as_deref(), Some("next"));
    }

    #[test]
    fn test_page_store_query_isolation() {
        let store = PageStore::new(1024 * 1024);
        let listing = MessagePage::new(vec![message("a", "x")], None);
        let search = MessagePage::new(vec![message("b", "y")], None);
        store.insert(PageKey::listing("tok"), listing);
        store.insert(PageKey::search("from:bob", "tok"), search);
        assert_eq!(
            store.get(&PageKey::listing("tok")).unwrap().messages[0].id,
            "a"
        );
        assert_eq!(
            store
                .get(&PageKey::search("from:bob", "tok"))
                .unwrap()
                .messages[0]
                .id,
            "b"
        );
    }

    #[test]
    fn test_shrink_sweep() {
        let store = MessageStore::new(1024 * 1024);
        for i in 0..10 {
            store.insert(message(&format!("m{}", i), &"x".repeat(1000)));
        }
        let before = store.occupancy();
        assert!(before.bytes > 5000);
        store.shrink_to(3000);
        let after = store.occupancy();
        assert!(after.bytes <= 3000);
        assert_eq!(after.budget_bytes, 3000);
        // Newest entries survive the sweep.
        assert!(store.contains("m9"));
        assert!(!store.contains("m0"));
    }
}
