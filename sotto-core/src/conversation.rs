// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::identity::SessionIdentity;

/// Stable id the host client assigned to a conversation. Opaque to the
/// overlay, only used as map key and correlation key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub u64);

impl Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConversationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One ongoing chat as the overlay sees it: the host-assigned id plus the
/// normalized identity triple.
///
/// Created by the host client and handed over through the "conversation
/// started" notification; dropped again on the "conversation ended"
/// notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    identity: SessionIdentity,
}

impl Conversation {
    pub fn new(id: ConversationId, identity: SessionIdentity) -> Self {
        Self { id, identity }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }
}
