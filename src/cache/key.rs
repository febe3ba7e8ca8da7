//! Page cache key.

use serde::{Deserialize, Serialize};

/// Composite key for the page cache.
///
/// A page is identified by its continuation token plus the query that
/// produced it; plain listings and search results render to disjoint
/// namespaces so they can never collide on the same token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub token: String,
    pub query: Option<String>,
}

impl PageKey {
    pub fn new(token: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            token: token.into(),
            query: query.map(|q| q.to_string()),
        }
    }

    /// Key for a page of the plain mailbox listing.
    pub fn listing(token: impl Into<String>) -> Self {
        Self::new(token, None)
    }

    /// Key for a page of search results.
    pub fn search(query: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            query: Some(query.into()),
        }
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.query {
            Some(q) => write!(f, "search:{}:{}", q, self.token),
            None => write!(f, "list:{}", self.token),
        }
    }
}

impl From<&str> for PageKey {
    fn from(token: &str) -> Self {
        Self::listing(token)
    }
}

impl From<String> for PageKey {
    fn from(token: String) -> Self {
        Self::listing(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_and_search_never_collide() {
        let listing = PageKey::listing("tok123");
        let search = PageKey::search("from:alice", "tok123");
        assert_ne!(listing, search);
        assert_ne!(listing.to_string(), search.to_string());
    }

    #[test]
    fn test_display() {
        assert_eq!(PageKey::listing("t1").to_string(), "list:t1");
        assert_eq!(PageKey::search("q", "t1").to_string(), "search:q:t1");
    }

    #[test]
    fn test_from_token() {
        let key: PageKey = "abc".into();
        assert_eq!(key, PageKey::listing("abc"));
        assert!(key.query.is_none());
    }
}
