// SPDX-License-Identifier: MIT OR Apache-2.0

//! The overlay facade and its send/receive transform pipeline.
//!
//! The host client owns an [`Overlay`] and feeds it four notifications:
//! [`conversation_started`], [`conversation_ended`], [`on_send`] and
//! [`on_receive`]. Everything else happens inside: engine calls, callback
//! dispatch, correlation bookkeeping and event publication all run
//! synchronously on the caller's thread.
//!
//! [`conversation_started`]: Overlay::conversation_started
//! [`conversation_ended`]: Overlay::conversation_ended
//! [`on_send`]: Overlay::on_send
//! [`on_receive`]: Overlay::on_receive
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use sotto_core::{
    AccountId, Conversation, ConversationId, Event, InboundMessage, OutboundMessage, Policy,
    ProtocolId, SessionSnapshot, TrustLevel,
};

use crate::bridge::{Bridge, DelegatedAction};
use crate::engine::{AuxMarker, InstanceTag};
use crate::error::{OverlayError, PersistenceError};
use crate::store::KeyStores;
use crate::strings;
use crate::traits::{ChatHost, ProtocolEngine};

/// Process-wide overlay configuration, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Directory the engine's store files live in, normally the host
    /// client's profile directory.
    pub profile_dir: PathBuf,

    /// Refuse to ever send plaintext. Off by default: encryption is
    /// negotiated opportunistically.
    #[serde(default)]
    pub require_encryption: bool,
}

/// The encryption overlay: engine driver, callback bridge and message
/// pipeline in one object.
#[derive(Debug)]
pub struct Overlay<E, H> {
    engine: E,
    bridge: Bridge<H>,
    stores: KeyStores,
}

impl<E, H> Overlay<E, H>
where
    E: ProtocolEngine,
    H: ChatHost,
{
    pub fn new(engine: E, host: H, config: OverlayConfig) -> Self {
        let policy = Policy::from_require_encryption(config.require_encryption);
        Self {
            engine,
            bridge: Bridge::new(policy, host),
            stores: KeyStores::new(&config.profile_dir),
        }
    }

    /// Brings the engine up: ensures the store files exist, initializes the
    /// engine and loads private keys and fingerprints.
    pub fn start(&mut self) -> Result<(), OverlayError> {
        self.stores.ensure_exist().map_err(PersistenceError::from)?;
        self.engine.init()?;
        self.engine
            .read_private_keys(&self.stores.private_keys)
            .map_err(PersistenceError::Engine)?;
        self.engine
            .read_fingerprints(&self.stores.fingerprints)
            .map_err(PersistenceError::Engine)?;
        Ok(())
    }

    /// Shuts the engine down. Counterpart of [`start`](Overlay::start).
    pub fn close(&mut self) {
        self.engine.shutdown();
    }

    /// Subscribes to overlay notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bridge.bus.subscribe()
    }

    pub fn policy(&self) -> Policy {
        self.bridge.policy
    }

    pub fn host(&self) -> &H {
        &self.bridge.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.bridge.host
    }

    /// The host announced a new conversation. Registers it and, when no
    /// local key material exists yet for the account, generates it.
    pub fn conversation_started(&mut self, conversation: Conversation) -> Result<(), OverlayError> {
        let identity = conversation.identity().clone();
        self.bridge.registry.register(conversation);

        if self
            .engine
            .key_fingerprint(&identity.account, &identity.protocol)
            .is_none()
        {
            debug!(
                "no local key material for {}/{}, generating",
                identity.account, identity.protocol
            );
            self.engine
                .generate_private_key(&self.stores.private_keys, &identity.account, &identity.protocol)
                .map_err(PersistenceError::Engine)?;
        }
        Ok(())
    }

    /// The host tore a conversation down. Drops the registry entry and every
    /// buffered correlation entry for it.
    pub fn conversation_ended(&mut self, id: ConversationId) {
        if self.bridge.registry.unregister(id).is_none() {
            debug!("conversation {id} ended but was never registered");
        }
        self.bridge.buffer.purge(id);
    }

    /// Send path: transforms an outgoing message through the engine.
    ///
    /// On success the message payload is what must go on the wire. On error
    /// the message has been cancelled and the returned error is the report;
    /// the caller must not transmit a cancelled message.
    pub fn on_send(&mut self, message: &mut OutboundMessage) -> Result<(), OverlayError> {
        if message.is_cancelled() {
            return Ok(());
        }

        let Some(conversation) = self.bridge.registry.get(message.conversation()).cloned() else {
            message.cancel();
            return Err(OverlayError::UnknownConversation(message.conversation()));
        };

        debug!(
            "pre send on {}: {} bytes",
            conversation.id(),
            message.text().len()
        );

        let result = self.engine.encode_outgoing(
            &mut self.bridge,
            conversation.identity(),
            InstanceTag::Best,
            message.text(),
        );
        self.run_delegated();

        let replacement = match result {
            Ok(replacement) => replacement,
            Err(code) => {
                message.cancel();
                return Err(code.into());
            }
        };

        match replacement {
            // An empty replacement means the engine consumed the message
            // internally; nothing goes on the wire.
            Some(wire) if wire.is_empty() => message.cancel(),
            Some(wire) if wire != message.text() => {
                self.bridge
                    .buffer
                    .record(conversation.id(), message.text(), wire.as_str());
                message.replace_text(wire);
            }
            _ => {}
        }

        debug!(
            "post send on {} (cancelled: {})",
            conversation.id(),
            message.is_cancelled()
        );
        Ok(())
    }

    /// Receive path: transforms a message the host is about to display.
    ///
    /// Never fails hard. Undecodable messages and protocol control traffic
    /// are cancelled and logged; the local echo of own messages is resolved
    /// against the correlation buffer.
    pub fn on_receive(&mut self, message: &mut InboundMessage) {
        if message.is_cancelled() || message.is_system() {
            return;
        }

        if message.is_outgoing() {
            self.pluck(message);
            return;
        }

        let Some(conversation) = self.bridge.registry.get(message.conversation()).cloned() else {
            warn!("receiving on unknown conversation {}", message.conversation());
            message.cancel();
            return;
        };

        debug!(
            "pre receive on {}: {} bytes",
            conversation.id(),
            message.text().len()
        );

        let (status, decoded) = self.engine.decode_incoming(
            &mut self.bridge,
            conversation.identity(),
            message.text(),
        );
        self.run_delegated();

        if let Some(replacement) = decoded.replacement {
            message.replace_text(replacement);
        }

        // The peer may end the session on the same wire message that carries
        // its last payload, so markers are handled regardless of status.
        if decoded.markers.contains(&AuxMarker::Disconnected) {
            let session = self.engine.session(conversation.identity(), InstanceTag::Best);
            self.bridge
                .alert(&session, &strings::session_ended(session.identity.peer.as_str()));
            self.bridge.publish_state(&session);
        }

        if let Err(code) = status {
            self.bridge.log(format!(
                "discarding inbound message on {}: {code}",
                conversation.id()
            ));
            message.cancel();
        } else {
            debug!("post receive on {}", conversation.id());
        }
    }

    /// Ends the private session with the conversation's peer.
    ///
    /// With `remove` set the conversation is torn down afterwards, otherwise
    /// its fresh state is republished so listeners see the downgrade.
    pub fn disconnect(&mut self, id: ConversationId, remove: bool) {
        let Some(conversation) = self.bridge.registry.get(id).cloned() else {
            warn!("disconnect for unknown conversation {id}");
            return;
        };

        self.engine
            .end_session(&mut self.bridge, conversation.identity(), InstanceTag::Best);
        self.run_delegated();

        if remove {
            self.conversation_ended(id);
        } else {
            let session = self.engine.session(conversation.identity(), InstanceTag::Best);
            self.bridge.publish_state(&session);
        }
    }

    /// Sends the protocol query message inviting the peer to negotiate
    /// encryption under the configured policy.
    pub fn send_query(&mut self, id: ConversationId) {
        let Some(account) = self
            .bridge
            .registry
            .get(id)
            .map(|conversation| conversation.identity().account.clone())
        else {
            warn!("query for unknown conversation {id}");
            return;
        };

        let query = self.engine.query_message(&account, self.bridge.policy);
        self.bridge.host.send_raw(id, &query);
    }

    /// Fresh snapshot of the session behind a conversation, `None` when the
    /// conversation is not registered.
    pub fn session(&mut self, id: ConversationId) -> Option<SessionSnapshot> {
        let identity = self.bridge.registry.get(id)?.identity().clone();
        Some(self.engine.session(&identity, InstanceTag::Best))
    }

    /// Current trust classification of a conversation, recomputed on every
    /// call.
    pub fn trust(&mut self, id: ConversationId) -> Option<TrustLevel> {
        self.session(id).map(|session| session.trust())
    }

    /// Fingerprint of the local long-term key, `None` when no key material
    /// exists yet.
    pub fn key_fingerprint(&self, account: &AccountId, protocol: &ProtocolId) -> Option<String> {
        self.engine.key_fingerprint(account, protocol)
    }

    /// Local echo handling: swap reclaimed ciphertext for the original
    /// plaintext, suppress echoes that were never recorded.
    fn pluck(&mut self, message: &mut InboundMessage) {
        match self
            .bridge
            .buffer
            .reclaim(message.conversation(), message.text())
        {
            Some(displayed) => {
                debug!("echo on {} correlated", message.conversation());
                message.replace_text(displayed);
            }
            None => {
                // This overlay never sent it, so it must not be shown.
                debug!("uncorrelated echo on {} suppressed", message.conversation());
                message.cancel();
            }
        }
    }

    /// Executes the actions the engine requested through callback slots
    /// during the preceding engine call. Failures are reported, never
    /// propagated: the pipeline call that triggered them has already
    /// succeeded or failed on its own terms.
    fn run_delegated(&mut self) {
        for action in self.bridge.take_pending() {
            let result = match &action {
                DelegatedAction::GeneratePrivateKey { account, protocol } => self
                    .engine
                    .generate_private_key(&self.stores.private_keys, account, protocol),
                DelegatedAction::GenerateInstanceTag { account, protocol } => self
                    .engine
                    .generate_instance_tag(&self.stores.instance_tags, account, protocol),
                DelegatedAction::WriteFingerprints => {
                    self.engine.write_fingerprints(&self.stores.fingerprints)
                }
            };
            if let Err(code) = result {
                error!("delegated action {action:?} failed: {code}");
                self.bridge.log(format!("delegated action failed: {code}"));
            }
        }
    }
}
