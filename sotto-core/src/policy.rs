// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// Encryption policy handed to the engine whenever it asks.
///
/// Selected once at overlay construction and immutable afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Negotiate encryption when the peer advertises support, otherwise let
    /// plaintext pass.
    #[default]
    Opportunistic,

    /// Refuse to send plaintext.
    Always,
}

impl Policy {
    pub fn from_require_encryption(require_encryption: bool) -> Self {
        if require_encryption {
            Self::Always
        } else {
            Self::Opportunistic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Policy;

    #[test]
    fn serializes_with_stable_names() {
        // Host clients persist the policy in their own configuration, so the
        // wire names are part of the public interface.
        assert_eq!(serde_json::to_string(&Policy::Always).unwrap(), "\"always\"");
        assert_eq!(
            serde_json::from_str::<Policy>("\"opportunistic\"").unwrap(),
            Policy::Opportunistic
        );
    }

    #[test]
    fn require_encryption_maps_to_always() {
        assert_eq!(Policy::from_require_encryption(true), Policy::Always);
        assert_eq!(Policy::from_require_encryption(false), Policy::Opportunistic);
    }
}
