//! End-to-end tests driving the preloader the way an application would:
//! opportunistic preload triggers, cache-first lookups, direct fallback.

use async_trait::async_trait;
use mail_preload::{
    LifecycleState, Message, MessagePage, MessagePart, MessageSource, PageKey, PreloadConfig,
    Preloader, Result,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const PAGE_SIZE: usize = 5;

/// In-memory mailbox serving deterministic pages of PAGE_SIZE messages.
/// Page tokens are "page-N"; an empty token means the first page.
struct Mailbox {
    messages: Vec<Message>,
    api_calls: AtomicUsize,
    fetched_ids: Mutex<Vec<String>>,
}

impl Mailbox {
    fn with_messages(count: usize) -> Self {
        let messages = (0..count)
            .map(|i| {
                Message::new(format!("msg-{:03}", i))
                    .with_header("Subject", format!("Message {}", i))
                    .with_snippet(format!("snippet {}", i))
                    .with_body(MessagePart::text(format!("body of message {}", i)))
            })
            .collect();
        Self {
            messages,
            api_calls: AtomicUsize::new(0),
            fetched_ids: Mutex::new(Vec::new()),
        }
    }

    fn page_start(&self, token: &str) -> usize {
        if token.is_empty() {
            0
        } else {
            token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0)
                * PAGE_SIZE
        }
    }

    fn page_at(&self, start: usize) -> MessagePage {
        let end = (start + PAGE_SIZE).min(self.messages.len());
        let next = if end < self.messages.len() {
            Some(format!("page-{}", end / PAGE_SIZE))
        } else {
            None
        };
        MessagePage::new(self.messages[start..end].to_vec(), next)
    }
}

#[async_trait]
impl MessageSource for Mailbox {
    async fn list_page(&self, _max_results: u32, page_token: &str) -> Result<MessagePage> {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.page_at(self.page_start(page_token)))
    }

    async fn search_page(
        &self,
        query: &str,
        _max_results: u32,
        _page_token: &str,
    ) -> Result<MessagePage> {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        let matching = self
            .messages
            .iter()
            .filter(|m| m.snippet.as_deref().is_some_and(|s| s.contains(query)))
            .cloned()
            .collect();
        Ok(MessagePage::new(matching, None))
    }

    async fn fetch_batch(&self, ids: &[String], _concurrency: usize) -> Result<Vec<Message>> {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched_ids.lock().unwrap().extend(ids.iter().cloned());
        let by_id: HashMap<&str, &Message> =
            self.messages.iter().map(|m| (m.id.as_str(), m)).collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|m| (*m).clone()))
            .collect())
    }
}

async fn wait_for_page(preloader: &Preloader, key: &PageKey) -> Arc<MessagePage> {
    for _ in 0..200 {
        // Peek via status to avoid polluting hit/miss counts while polling.
        if preloader.status().page_cache.entries > 0 {
            if let Some(page) = preloader.cached_page(key) {
                return page;
            }
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("page {} never became cached", key);
}

#[tokio::test]
async fn scroll_preload_then_navigate() {
    let mailbox = Arc::new(Mailbox::with_messages(12));
    let preloader = Preloader::new(mailbox.clone()).unwrap();

    // The application fetched page 0 directly; scrolling past the threshold
    // triggers a preload of page 1 using the continuation token.
    let first = mailbox.list_page(PAGE_SIZE as u32, "").await.unwrap();
    let token = first.next_page_token.clone().unwrap();
    preloader
        .preload_next_page(&token, None, PAGE_SIZE as u32)
        .unwrap();

    let key = PageKey::listing(&token);
    let page = wait_for_page(&preloader, &key).await;
    assert_eq!(page.len(), PAGE_SIZE);
    // Source ordering is preserved inside the cached page.
    let ids: Vec<_> = page.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["msg-005", "msg-006", "msg-007", "msg-008", "msg-009"]);

    // Navigating to page 1 is now a pure cache hit: the direct list call and
    // the single background fetch are all the API traffic there is.
    assert_eq!(mailbox.api_calls.load(Ordering::SeqCst), 2);

    let status = preloader.status();
    assert_eq!(status.state, LifecycleState::Running);
    assert!(status.stats.bytes_loaded > 0);
    assert!(status.page_cache.bytes <= status.page_cache.budget_bytes);
}

#[tokio::test]
async fn selection_change_preloads_neighbors() {
    let mailbox = Arc::new(Mailbox::with_messages(12));
    let preloader = Preloader::builder()
        .with_config(PreloadConfig::new().with_adjacent_count(5))
        .build(mailbox.clone())
        .unwrap();

    let listing: Vec<String> = (0..12).map(|i| format!("msg-{:03}", i)).collect();
    preloader.preload_adjacent("msg-006", &listing).unwrap();

    for _ in 0..200 {
        if preloader.status().item_cache.entries == 4 {
            break;
        }
        sleep(Duration::from_millis(5)).await;
    }

    // Half-width 2 around index 6, current excluded.
    let fetched = mailbox.fetched_ids.lock().unwrap().clone();
    let mut fetched_sorted = fetched.clone();
    fetched_sorted.sort();
    assert_eq!(
        fetched_sorted,
        ["msg-004", "msg-005", "msg-007", "msg-008"]
    );

    // Opening a neighbor is a hit and carries the full payload.
    let message = preloader.cached_message("msg-007").unwrap();
    assert_eq!(message.subject(), Some("Message 7"));
    assert_eq!(preloader.status().stats.hits, 1);
}

#[tokio::test]
async fn cache_miss_falls_back_to_direct_fetch() {
    let mailbox = Arc::new(Mailbox::with_messages(12));
    let preloader = Preloader::new(mailbox.clone()).unwrap();

    // Nothing preloaded: the lookup misses and the app goes to the source.
    assert!(preloader.cached_message("msg-002").is_none());
    let direct = mailbox
        .fetch_batch(&["msg-002".to_string()], 1)
        .await
        .unwrap();
    assert_eq!(direct[0].id, "msg-002");

    let stats = preloader.status().stats;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.hit_ratio(), 0.0);
}

#[tokio::test]
async fn search_and_listing_pages_are_isolated() {
    let mailbox = Arc::new(Mailbox::with_messages(12));
    let preloader = Preloader::new(mailbox.clone()).unwrap();

    preloader
        .preload_next_page("page-1", Some("snippet 7"), 25)
        .unwrap();
    let key = PageKey::search("snippet 7", "page-1");
    let page = wait_for_page(&preloader, &key).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page.messages[0].id, "msg-007");

    // Same token without the query resolves to a different cache entry.
    assert!(preloader.cached_page(&PageKey::listing("page-1")).is_none());
}

#[tokio::test]
async fn runtime_reconfiguration() {
    let mailbox = Arc::new(Mailbox::with_messages(12));
    let preloader = Preloader::new(mailbox.clone()).unwrap();

    // Disabling preloading turns triggers into advisory errors...
    preloader
        .update_config(PreloadConfig::new().with_enabled(false))
        .unwrap();
    let err = preloader.preload_next_page("page-1", None, 25).unwrap_err();
    assert!(err.is_advisory());

    // ...and re-enabling restores them without rebuilding the preloader.
    preloader.update_config(PreloadConfig::new()).unwrap();
    preloader.preload_next_page("page-1", None, 25).unwrap();
    wait_for_page(&preloader, &PageKey::listing("page-1")).await;
}

#[tokio::test]
async fn shutdown_quiesces_everything() {
    let mailbox = Arc::new(Mailbox::with_messages(12));
    let preloader = Preloader::new(mailbox.clone()).unwrap();

    preloader.preload_next_page("page-1", None, 25).unwrap();
    wait_for_page(&preloader, &PageKey::listing("page-1")).await;
    let calls_before = mailbox.api_calls.load(Ordering::SeqCst);

    preloader.shutdown();
    preloader.shutdown(); // second call is a no-op
    preloader.join().await;

    let status = preloader.status();
    assert_eq!(status.state, LifecycleState::Stopped);
    assert_eq!(status.total_entries(), 0);
    assert_eq!(status.total_bytes(), 0);

    // Triggers are silent no-ops now; no new API traffic appears.
    preloader.preload_next_page("page-2", None, 25).unwrap();
    preloader
        .preload_adjacent("msg-001", &["msg-000".into(), "msg-001".into()])
        .unwrap();
    assert!(preloader.cached_page(&PageKey::listing("page-1")).is_none());
    sleep(Duration::from_millis(50)).await;
    assert_eq!(mailbox.api_calls.load(Ordering::SeqCst), calls_before);
}
