//! Message format shared between the source interface and the caches.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single RFC 822 style header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One fetched message.
///
/// The payload lives in a MIME-like part tree under `body`; multipart
/// messages nest their alternatives and attachments in `MessagePart::parts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: Option<String>,
    pub headers: Vec<Header>,
    pub snippet: Option<String>,
    pub body: MessagePart,
}

impl Message {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            thread_id: None,
            headers: Vec::new(),
            snippet: None,
            body: MessagePart::empty(),
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_body(mut self, body: MessagePart) -> Self {
        self.body = body;
        self
    }

    /// First `Subject` header, if present.
    pub fn subject(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case("subject"))
            .map(|h| h.value.as_str())
    }

    pub fn has_attachments(&self) -> bool {
        self.body.walk_any(|p| {
            p.headers
                .iter()
                .any(|h| h.name.eq_ignore_ascii_case("content-disposition") && h.value.contains("attachment"))
        })
    }
}

/// A node in a message's MIME part tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePart {
    pub mime_type: String,
    pub headers: Vec<Header>,
    pub body: Bytes,
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    pub fn empty() -> Self {
        Self {
            mime_type: String::new(),
            headers: Vec::new(),
            body: Bytes::new(),
            parts: Vec::new(),
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self {
            mime_type: "text/plain".to_string(),
            headers: Vec::new(),
            body: Bytes::from(body.into()),
            parts: Vec::new(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn with_part(mut self, part: MessagePart) -> Self {
        self.parts.push(part);
        self
    }

    fn walk_any(&self, pred: impl Fn(&MessagePart) -> bool + Copy) -> bool {
        pred(self) || self.parts.iter().any(|p| p.walk_any(pred))
    }
}
