// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::identity::SessionIdentity;
use crate::trust::TrustLevel;

/// Protocol state of a session as reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageState {
    /// No encryption negotiated, messages pass through unchanged.
    Plaintext,

    /// An encrypted session is established.
    Encrypted,

    /// The peer or the local side ended the encrypted session; sending is
    /// blocked until a new key exchange happens.
    Finished,
}

/// By-value snapshot of an engine-owned session context.
///
/// The engine owns the actual session state and may invalidate it at any
/// point (for example on disconnect), so the overlay never holds a reference
/// into it. A snapshot is only meaningful for the scope of the call that
/// produced it; trust in particular is recomputed from a fresh snapshot on
/// every query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub identity: SessionIdentity,
    pub state: MessageState,

    /// Whether the fingerprint the session was keyed with has been verified
    /// by the user.
    pub verified: bool,
}

impl SessionSnapshot {
    pub fn trust(&self) -> TrustLevel {
        TrustLevel::classify(self.state, self.verified)
    }
}
