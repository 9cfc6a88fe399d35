// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message wrappers passed through the transform pipeline.
//!
//! Cancellation is cooperative: every pipeline stage checks the flag before
//! doing work and any stage may set it. A cancelled outbound message never
//! reaches the transport, a cancelled inbound message is never displayed.
use crate::conversation::ConversationId;

/// A message the host client is about to hand to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    conversation: ConversationId,
    text: String,
    cancelled: bool,
}

impl OutboundMessage {
    pub fn new(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation,
            text: text.into(),
            cancelled: false,
        }
    }

    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    /// Current payload. Before the pipeline ran this is what the user typed;
    /// afterwards it is what goes on the wire.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn replace_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A message the host client is about to display.
///
/// This covers both traffic that arrived from the peer and the local echo of
/// messages the user sent themselves (`outgoing`), which the host routes
/// back through the receive path so ciphertext can be swapped for the
/// original plaintext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    conversation: ConversationId,
    text: String,
    cancelled: bool,
    system: bool,
    outgoing: bool,
}

impl InboundMessage {
    /// A message that arrived from the peer.
    pub fn received(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation,
            text: text.into(),
            cancelled: false,
            system: false,
            outgoing: false,
        }
    }

    /// The local echo of a message this side sent.
    pub fn echo(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            outgoing: true,
            ..Self::received(conversation, text)
        }
    }

    /// A synthetic system notice, exempt from the pipeline.
    pub fn system(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            system: true,
            ..Self::received(conversation, text)
        }
    }

    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    /// Text the host is about to display.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn replace_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_system(&self) -> bool {
        self.system
    }

    pub fn is_outgoing(&self) -> bool {
        self.outgoing
    }
}
