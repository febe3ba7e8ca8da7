//! Preload error types

/// Error type for the preload subsystem.
///
/// Everything except [`PreloadError::InvalidConfig`] and [`PreloadError::Source`]
/// is advisory: a failed preload only costs a cache-warming opportunity, never
/// correctness. Callers are expected to fall back to a direct fetch.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    #[error("preloading is disabled")]
    Disabled,

    #[error("page token is empty; nothing to continue from")]
    EmptyPageToken,

    #[error("message '{id}' is not present in the provided listing")]
    UnknownMessageId { id: String },

    #[error("preload queue is full")]
    QueueFull,

    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("source error: {message}")]
    Source { message: String, retryable: bool },
}

impl PreloadError {
    /// Build a non-retryable source error from any displayable cause.
    pub fn source(message: impl Into<String>) -> Self {
        PreloadError::Source {
            message: message.into(),
            retryable: false,
        }
    }

    /// Build a retryable source error (rate limit, transient network failure).
    pub fn source_retryable(message: impl Into<String>) -> Self {
        PreloadError::Source {
            message: message.into(),
            retryable: true,
        }
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        PreloadError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error only affects the optimization, not correctness.
    ///
    /// Advisory errors should never abort the caller's own request path.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            PreloadError::Disabled
                | PreloadError::EmptyPageToken
                | PreloadError::UnknownMessageId { .. }
                | PreloadError::QueueFull
        )
    }
}
