//! The remote message store interface consumed by the preloader.

use crate::types::{Message, MessagePage};
use crate::Result;
use async_trait::async_trait;

/// Abstract paginated message store.
///
/// The preloader depends only on this contract; the concrete remote-API
/// client (transport, auth, retry policy) lives with the application and is
/// injected as an `Arc<dyn MessageSource>`. Implementations must be safe to
/// call from multiple workers concurrently.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch one page of the plain mailbox listing.
    ///
    /// An empty `page_token` means the first page; otherwise it is the opaque
    /// continuation token from a previous page.
    async fn list_page(&self, max_results: u32, page_token: &str) -> Result<MessagePage>;

    /// Fetch one page of results for a search query.
    async fn search_page(
        &self,
        query: &str,
        max_results: u32,
        page_token: &str,
    ) -> Result<MessagePage>;

    /// Hydrate a batch of messages by id.
    ///
    /// `concurrency` is a hint for how many per-id requests the implementation
    /// may issue in parallel. Returned messages may arrive in any order and
    /// ids the store no longer knows may simply be absent from the result.
    async fn fetch_batch(&self, ids: &[String], concurrency: usize) -> Result<Vec<Message>>;
}
