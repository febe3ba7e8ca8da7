//! Preloader facade.
//!
//! [`Preloader`] is the only type application code talks to. Its preload
//! triggers are advisory and non-blocking: they either enqueue background
//! work or explain in an advisory error why they did not, and the caller's
//! own request path is never gated on them. Cached lookups are synchronous
//! constant-time operations; when they miss, the caller falls back to a
//! direct fetch through the same [`MessageSource`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use mail_preload::{PageKey, Preloader, PreloadConfig};
//! # use mail_preload::MessageSource;
//! # async fn demo(source: std::sync::Arc<dyn MessageSource>) -> mail_preload::Result<()> {
//! let preloader = Preloader::builder()
//!     .with_config(PreloadConfig::new().with_cache_size_mb(100))
//!     .build(source)?;
//!
//! // User scrolled far enough: warm the next page in the background.
//! let _ = preloader.preload_next_page("token-abc", None, 25);
//!
//! // Later, on navigation: serve from cache when the fetch won the race.
//! if let Some(page) = preloader.cached_page(&PageKey::listing("token-abc")) {
//!     println!("{} messages ready", page.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`MessageSource`]: crate::source::MessageSource

mod builder;
mod core;
mod status;

pub use builder::PreloaderBuilder;
pub use core::Preloader;
pub use status::{LifecycleState, PreloaderStatus};
