// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sotto-overlay` retrofits transparent end-to-end encryption onto an
//! existing instant-messaging client.
//!
//! The host client routes four notifications into the overlay: conversation
//! start and end, "about to send" and "about to display". The overlay passes
//! every message through a pluggable cryptographic [`ProtocolEngine`] and
//! reconciles the engine's output with what the user actually typed, so the
//! UI always shows plaintext while the wire carries ciphertext.
//!
//! The central trick is the correlation buffer: when the engine replaces an
//! outgoing plaintext with ciphertext, the overlay remembers the pair. When
//! the host later echoes the sent message back for display, the ciphertext is
//! swapped for the remembered plaintext. An echo that was never recorded is
//! suppressed, it does not correspond to anything this overlay sent.
//!
//! The engine is synchronous and callback-reentrant: during an encode or
//! decode call it calls back into the overlay through the [`EngineCallbacks`]
//! slot table (policy queries, message injection, state-change signals,
//! delegated key management). State changes are republished to listeners as
//! typed [`Event`]s on a broadcast bus.
//!
//! [`Event`]: sotto_core::Event
pub mod buffer;
pub mod engine;
pub mod error;
pub mod overlay;
pub mod registry;
pub mod store;
pub mod traits;

mod bridge;
mod strings;
#[cfg(test)]
mod test_utils;

pub use buffer::CorrelationBuffer;
pub use engine::{
    AuxMarker, ConvertDirection, Decoded, EngineCode, InstanceTag, MessageEvent, SmpEvent,
};
pub use error::{OverlayError, PersistenceError};
pub use overlay::{Overlay, OverlayConfig};
pub use registry::ConversationRegistry;
pub use store::KeyStores;
pub use traits::{ChatHost, EngineCallbacks, ProtocolEngine};
