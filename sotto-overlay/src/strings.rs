// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing alert texts. Localization is the host client's business; these
//! are the plain fallback strings.

pub(crate) fn gone_secure(peer: &str) -> String {
    format!("Private conversation with {peer} started.")
}

pub(crate) fn still_secure(peer: &str) -> String {
    format!("Private conversation with {peer} refreshed.")
}

pub(crate) fn session_ended(peer: &str) -> String {
    format!(
        "{peer} has ended their private conversation with you; \
         you should do the same."
    )
}

pub(crate) fn received_unencrypted(message: &str) -> String {
    format!("The following message was received unencrypted: {message}")
}
