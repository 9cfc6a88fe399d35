// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::session::MessageState;

/// User-facing trust classification of a session.
///
/// Always derived from a fresh [`MessageState`] and fingerprint verification
/// flag, never stored: the underlying session can change asynchronously
/// through engine callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustLevel {
    /// No encrypted session.
    NotPrivate,

    /// Encrypted, but the peer's fingerprint has not been verified.
    Unverified,

    /// Encrypted with a verified fingerprint.
    Private,

    /// The encrypted session has ended.
    Finished,
}

impl TrustLevel {
    /// Classifies a session state and fingerprint verification flag.
    ///
    /// The flag only matters for encrypted sessions; for plaintext and
    /// finished sessions it is ignored.
    pub fn classify(state: MessageState, verified: bool) -> Self {
        match state {
            MessageState::Encrypted if verified => Self::Private,
            MessageState::Encrypted => Self::Unverified,
            MessageState::Finished => Self::Finished,
            MessageState::Plaintext => Self::NotPrivate,
        }
    }
}
