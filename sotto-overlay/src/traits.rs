// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait boundaries of the overlay.
//!
//! [`ProtocolEngine`] is the cryptographic engine the overlay drives,
//! [`EngineCallbacks`] is the slot table the engine calls back into while an
//! encode or decode is running, and [`ChatHost`] is the minimal surface the
//! overlay needs from the hosting chat client.
use std::path::Path;

use sotto_core::{AccountId, ConversationId, Policy, ProtocolId, SessionIdentity, SessionSnapshot};

use crate::engine::{
    ConvertDirection, Decoded, EngineCode, InstanceTag, MessageEvent, SmpEvent, TimerInterval,
};

/// A cryptographic protocol engine.
///
/// The engine owns all session state (key exchange, fragmentation, MAC
/// verification) and is free to call any [`EngineCallbacks`] slot while an
/// [`encode_outgoing`], [`decode_incoming`] or [`end_session`] call is in
/// progress, before returning.
///
/// [`encode_outgoing`]: ProtocolEngine::encode_outgoing
/// [`decode_incoming`]: ProtocolEngine::decode_incoming
/// [`end_session`]: ProtocolEngine::end_session
pub trait ProtocolEngine {
    /// Process-wide engine setup. Called once from [`Overlay::start`].
    ///
    /// [`Overlay::start`]: crate::Overlay::start
    fn init(&mut self) -> Result<(), EngineCode>;

    /// Process-wide engine teardown. Called once from [`Overlay::close`].
    ///
    /// [`Overlay::close`]: crate::Overlay::close
    fn shutdown(&mut self);

    /// Transforms an outgoing plaintext.
    ///
    /// Returns `Ok(None)` when the message should go out unchanged and
    /// `Ok(Some(text))` when `text` should replace it on the wire. An empty
    /// replacement means the engine consumed the message internally (for
    /// example a protocol control message with no user-visible payload).
    fn encode_outgoing(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
        tag: InstanceTag,
        plaintext: &str,
    ) -> Result<Option<String>, EngineCode>;

    /// Transforms an incoming wire message.
    ///
    /// A nonzero status means the message carried no user-visible payload
    /// (protocol control traffic or an undecodable message) and must not be
    /// displayed. The [`Decoded`] payload is meaningful either way, since
    /// markers can accompany rejected messages.
    fn decode_incoming(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
        ciphertext: &str,
    ) -> (Result<(), EngineCode>, Decoded);

    /// Finds or creates the session context for an identity triple and
    /// returns a snapshot of it.
    fn session(&mut self, identity: &SessionIdentity, tag: InstanceTag) -> SessionSnapshot;

    /// Ends the private session with a peer.
    fn end_session(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
        tag: InstanceTag,
    );

    /// Builds the protocol query message advertising `policy` to a peer.
    fn query_message(&self, account: &AccountId, policy: Policy) -> String;

    /// Human-readable fingerprint of the local long-term key, `None` when no
    /// key material exists yet for the account/protocol pair.
    fn key_fingerprint(&self, account: &AccountId, protocol: &ProtocolId) -> Option<String>;

    /// Loads private keys from the engine-formatted store file.
    fn read_private_keys(&mut self, path: &Path) -> Result<(), EngineCode>;

    /// Loads known peer fingerprints from the engine-formatted store file.
    fn read_fingerprints(&mut self, path: &Path) -> Result<(), EngineCode>;

    /// Persists the current fingerprint store.
    fn write_fingerprints(&mut self, path: &Path) -> Result<(), EngineCode>;

    /// Generates a new long-term key for an account/protocol pair.
    fn generate_private_key(
        &mut self,
        path: &Path,
        account: &AccountId,
        protocol: &ProtocolId,
    ) -> Result<(), EngineCode>;

    /// Generates a new instance tag for an account/protocol pair.
    fn generate_instance_tag(
        &mut self,
        path: &Path,
        account: &AccountId,
        protocol: &ProtocolId,
    ) -> Result<(), EngineCode>;
}

/// The fixed table of named callback slots the engine invokes synchronously
/// during a pipeline call.
///
/// Implemented by the overlay's callback bridge. Slots that have no
/// behavioral effect on correlation or trust are intentionally inert there:
/// they are logged and otherwise ignored, but the engine may invoke them at
/// any time.
pub trait EngineCallbacks {
    /// Returns the process-wide encryption policy.
    fn policy(&mut self, session: &SessionSnapshot) -> Policy;

    /// The engine needs a long-term key for this account before it can
    /// proceed.
    fn create_private_key(&mut self, account: &AccountId, protocol: &ProtocolId);

    /// Whether the recipient is known to be online. The overlay does not
    /// track presence and always answers yes.
    fn is_logged_in(&mut self, identity: &SessionIdentity) -> bool;

    /// Hands a protocol message to the transport, bypassing the send
    /// pipeline.
    fn inject_message(&mut self, identity: &SessionIdentity, message: &str);

    /// The engine's context list changed. Log-only.
    fn update_context_list(&mut self);

    /// A previously unknown peer fingerprint showed up. Log-only.
    fn new_fingerprint(&mut self, identity: &SessionIdentity, fingerprint: &str);

    /// The fingerprint store is dirty and should be persisted.
    fn write_fingerprints(&mut self);

    /// A private session was established.
    fn gone_secure(&mut self, session: &SessionSnapshot);

    /// Dead slot kept for engine compatibility; engines are not known to
    /// invoke it. Log-only.
    fn gone_insecure(&mut self, session: &SessionSnapshot);

    /// An already-private session was renegotiated. `is_reply` is set on the
    /// responding side of the exchange.
    fn still_secure(&mut self, session: &SessionSnapshot, is_reply: bool);

    /// Maximum wire-message size for the session's network, `0` for no
    /// limit. The engine fragments larger messages.
    fn max_message_size(&mut self, session: &SessionSnapshot) -> usize;

    /// Display name for an account. The overlay has no display names and
    /// returns `None`. Log-only.
    fn account_display_name(
        &mut self,
        account: &AccountId,
        protocol: &ProtocolId,
    ) -> Option<String>;

    /// Release slot paired with `account_display_name`. Log-only.
    fn account_display_name_free(&mut self);

    /// The peer established a symmetric key for an out-of-band use.
    /// Intentionally inert. Log-only.
    fn received_symmetric_key(&mut self, session: &SessionSnapshot, usage: u32, usage_data: &[u8]);

    /// Custom error text for a protocol error message, `None` for the engine
    /// default.
    fn error_message(&mut self, session: &SessionSnapshot, code: EngineCode) -> Option<String>;

    /// Release slot paired with `error_message`. Log-only.
    fn error_message_free(&mut self);

    /// Prefix for messages the engine resends, `None` for the engine
    /// default.
    fn resent_message_prefix(&mut self, session: &SessionSnapshot) -> Option<String>;

    /// Release slot paired with `resent_message_prefix`. Log-only.
    fn resent_message_prefix_free(&mut self);

    /// Progress of a socialist-millionaire verification. Log-only.
    fn handle_smp_event(
        &mut self,
        session: &SessionSnapshot,
        event: SmpEvent,
        progress_percent: u8,
        question: Option<&str>,
    );

    /// A protocol-level message event occurred (heartbeats, unencrypted
    /// traffic, session end).
    fn handle_message_event(&mut self, session: &SessionSnapshot, event: MessageEvent);

    /// The engine needs an instance tag for this account before it can
    /// proceed.
    fn create_instance_tag(&mut self, account: &AccountId, protocol: &ProtocolId);

    /// Offers a message for host-specific markup conversion. The overlay
    /// converts nothing. Log-only.
    fn convert_message(
        &mut self,
        session: &SessionSnapshot,
        direction: ConvertDirection,
        message: &str,
    );

    /// Release slot paired with `convert_message`. Log-only.
    fn convert_message_free(&mut self);

    /// The engine asks for a recurring timer. The overlay runs no timers.
    /// Log-only.
    fn timer_control(&mut self, interval: TimerInterval);
}

/// Minimal surface the overlay needs from the hosting chat client.
pub trait ChatHost {
    /// Hands `text` directly to the transport for `conversation`, without
    /// routing it through the send pipeline again.
    fn send_raw(&mut self, conversation: ConversationId, text: &str);

    /// Shows a system notice in the conversation window.
    fn system_message(&mut self, conversation: ConversationId, text: &str);
}
