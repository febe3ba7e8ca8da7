//! # mail-preload
//!
//! A predictive prefetch cache that sits in front of a paginated,
//! rate-limited remote message store and hides pagination latency from the
//! user: when the application signals a preload opportunity (the user
//! scrolled near the end of a page, or moved the selection), the preloader
//! speculatively fetches the next page or the neighboring messages in the
//! background and parks them in bounded in-memory caches.
//!
//! ## Core Philosophy
//!
//! - **Advisory, never blocking**: every preload trigger returns immediately;
//!   a failed or skipped preload costs nothing but a cache miss later
//! - **Bounded everything**: byte-budgeted LRU caches, a bounded task queue,
//!   a fixed worker pool; background work can never starve the foreground
//! - **Failure-isolated**: errors inside background fetches are logged and
//!   discarded; the caller's own request path never sees them
//! - **No singletons**: the [`Preloader`] is an owned value the application
//!   constructs and injects where needed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mail_preload::{PageKey, Preloader};
//! # use mail_preload::MessageSource;
//! # async fn demo(source: std::sync::Arc<dyn MessageSource>) -> mail_preload::Result<()> {
//! let preloader = Preloader::new(source)?;
//!
//! // Scroll handler: advisory, ignore advisory failures.
//! if let Err(err) = preloader.preload_next_page("page-token", None, 25) {
//!     debug_assert!(err.is_advisory());
//! }
//!
//! // Navigation handler: cache first, direct fetch on miss.
//! match preloader.cached_page(&PageKey::listing("page-token")) {
//!     Some(page) => println!("cache hit: {} messages", page.len()),
//!     None => { /* fall back to a direct source call */ }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`preloader`] | The facade: triggers, lookups, config updates, status, shutdown |
//! | [`cache`] | Byte-budgeted LRU caches for messages and pages |
//! | [`scheduler`] | Priority task queue, dispatcher and fixed worker pool |
//! | [`source`] | The `MessageSource` trait the application implements |
//! | [`types`] | Message, part and page types |
//! | [`config`] | Configuration surface and validation |
//! | [`stats`] | Hit/miss/load counters and derived ratios |

pub mod cache;
pub mod config;
pub mod preloader;
pub mod scheduler;
pub mod source;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheOccupancy, PageKey};
pub use config::PreloadConfig;
pub use preloader::{LifecycleState, Preloader, PreloaderBuilder, PreloaderStatus};
pub use source::MessageSource;
pub use stats::StatsSnapshot;
pub use types::{Header, Message, MessagePage, MessagePart};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, PreloadError>;

/// Error type for the library
pub mod error;
pub use error::PreloadError;
