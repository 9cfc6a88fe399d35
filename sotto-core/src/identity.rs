// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized chat identities.
//!
//! Host clients hand over account-, protocol- and peer names in whatever
//! casing and spacing their network produced. All correlation in the overlay
//! happens over the normalized form (trimmed, ASCII-lowercased), so two
//! spellings of the same peer always resolve to the same session.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

macro_rules! identity_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: &str) -> Self {
                Self(normalize(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identity_newtype!(
    /// Normalized name of a local account ("alice@example.org").
    AccountId
);

identity_newtype!(
    /// Normalized name of the chat network a conversation runs over ("xmpp",
    /// "irc").
    ProtocolId
);

identity_newtype!(
    /// Normalized name of the remote peer.
    PeerId
);

/// The `(account, protocol, peer)` triple identifying one cryptographic
/// session. Used as correlation key by the registry and as addressing
/// information for every engine call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub account: AccountId,
    pub protocol: ProtocolId,
    pub peer: PeerId,
}

impl SessionIdentity {
    pub fn new(account: AccountId, protocol: ProtocolId, peer: PeerId) -> Self {
        Self {
            account,
            protocol,
            peer,
        }
    }
}

impl Display for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.account, self.protocol, self.peer)
    }
}
