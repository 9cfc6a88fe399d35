// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use sotto_core::{Conversation, ConversationId, SessionIdentity, SessionSnapshot};

/// Registry of conversations the overlay is currently intercepting.
///
/// Entries are created on the host's "conversation started" notification and
/// removed on "conversation ended". Identity lookups are a linear scan over
/// the registered entries, which is fine for the low conversation counts a
/// chat client produces.
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    entries: HashMap<ConversationId, Conversation>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Adds or replaces the entry for the conversation's id. Idempotent.
    pub fn register(&mut self, conversation: Conversation) {
        self.entries.insert(conversation.id(), conversation);
    }

    /// Removes and returns the entry, `None` when the id was never
    /// registered.
    pub fn unregister(&mut self, id: ConversationId) -> Option<Conversation> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.entries.get(&id)
    }

    /// Finds the first registered conversation matching the identity triple.
    pub fn find(&self, identity: &SessionIdentity) -> Option<&Conversation> {
        self.entries
            .values()
            .find(|conversation| conversation.identity() == identity)
    }

    /// Resolves the conversation a session context belongs to.
    pub fn by_session(&self, session: &SessionSnapshot) -> Option<&Conversation> {
        self.find(&session.identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
