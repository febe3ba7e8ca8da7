//! Payload size estimation.

use crate::types::{Header, Message, MessagePage, MessagePart};

/// Per-item size cap: 10 MB.
///
/// Larger estimates are truncated to this figure rather than rejected, so a
/// single outsized message cannot exhaust the budget while still being
/// cacheable. The accounting number then understates the true payload size;
/// the stores additionally refuse entries whose clamped size would alone
/// exceed the whole budget.
pub const MAX_ITEM_BYTES: usize = 10 * 1024 * 1024;

fn headers_size(headers: &[Header]) -> usize {
    headers.iter().map(|h| h.name.len() + h.value.len()).sum()
}

fn part_size(part: &MessagePart) -> usize {
    part.mime_type.len()
        + headers_size(&part.headers)
        + part.body.len()
        + part.parts.iter().map(part_size).sum::<usize>()
}

/// Estimate the in-memory footprint of one message, clamped to
/// [`MAX_ITEM_BYTES`].
///
/// The estimate sums header and body byte lengths recursively over the part
/// tree; it deliberately ignores allocator overhead and struct padding.
pub fn estimate_message_size(message: &Message) -> usize {
    let size = message.id.len()
        + message.thread_id.as_ref().map_or(0, |t| t.len())
        + headers_size(&message.headers)
        + message.snippet.as_ref().map_or(0, |s| s.len())
        + part_size(&message.body);
    size.min(MAX_ITEM_BYTES)
}

/// Estimate the footprint of a whole page: its messages plus the token.
pub fn estimate_page_size(page: &MessagePage) -> usize {
    let size = page
        .messages
        .iter()
        .map(estimate_message_size)
        .sum::<usize>()
        + page.next_page_token.as_ref().map_or(0, |t| t.len());
    size.min(MAX_ITEM_BYTES)
}
