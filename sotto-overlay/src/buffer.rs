// SPDX-License-Identifier: MIT OR Apache-2.0

//! The correlation buffer reuniting sent ciphertext with typed plaintext.
//!
//! The engine is allowed to transform, fragment or consume an outgoing
//! message. The only reliable way to recover the user's original intent when
//! the host echoes the sent message back for display is exact text
//! correlation, keyed per conversation and resolved in submission order so
//! duplicate sends reclaim deterministically (oldest first).
use sotto_core::ConversationId;

#[derive(Clone, Debug, PartialEq, Eq)]
struct BufferedMessage {
    conversation: ConversationId,
    displayed: String,
    sent: String,
}

/// Ordered multiset of pending `(conversation, displayed, sent)` entries.
#[derive(Debug, Default)]
pub struct CorrelationBuffer {
    entries: Vec<BufferedMessage>,
}

impl CorrelationBuffer {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry. Never fails.
    pub fn record(
        &mut self,
        conversation: ConversationId,
        displayed: impl Into<String>,
        sent: impl Into<String>,
    ) {
        self.entries.push(BufferedMessage {
            conversation,
            displayed: displayed.into(),
            sent: sent.into(),
        });
    }

    /// Removes and returns the displayed text of the oldest entry whose sent
    /// text matches, `None` when the echo cannot be correlated.
    pub fn reclaim(&mut self, conversation: ConversationId, sent: &str) -> Option<String> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.conversation == conversation && entry.sent == sent)?;
        Some(self.entries.remove(index).displayed)
    }

    /// Drops all entries for a conversation. Called on conversation teardown
    /// so no entry outlives its conversation, even when the id is later
    /// reused.
    pub fn purge(&mut self, conversation: ConversationId) {
        self.entries.retain(|entry| entry.conversation != conversation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
