//! Page of messages returned by a paginated source.

use super::Message;
use serde::{Deserialize, Serialize};

/// One page of results plus the opaque continuation token.
///
/// Message order is preserved exactly as returned by the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub next_page_token: Option<String>,
}

impl MessagePage {
    pub fn new(messages: Vec<Message>, next_page_token: Option<String>) -> Self {
        Self {
            messages,
            next_page_token,
        }
    }

    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            next_page_token: None,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the source reported more results after this page.
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }
}
