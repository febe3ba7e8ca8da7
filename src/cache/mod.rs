//! Bounded in-memory caches for preloaded data.
//!
//! Two independent caches back the preloader: an item cache (message id →
//! message) and a page cache ([`PageKey`] → page of messages). Each owns its
//! own byte budget and strict LRU eviction order; they never share recency
//! state with each other.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`PageKey`] | Composite key separating plain listings from search results |
//! | [`MessageStore`] | Lock-protected byte-budgeted LRU of single messages |
//! | [`PageStore`] | Lock-protected byte-budgeted LRU of pages |
//! | [`estimate_message_size`] | Recursive payload size estimator |
//!
//! Eviction and insertion are O(1): the underlying [`lru::LruCache`] pairs a
//! hash map with an intrusive recency list, and this module layers byte
//! accounting on top. All mutating operations, including the recency refresh
//! performed by a successful lookup, take the store's exclusive lock; cache
//! work is constant-time and cheap next to the network fetches it saves.

mod key;
mod lru;
mod size;
mod store;

pub use key::PageKey;
pub use size::{estimate_message_size, estimate_page_size, MAX_ITEM_BYTES};
pub use store::{CacheOccupancy, MessageStore, PageStore};
