// SPDX-License-Identifier: MIT OR Apache-2.0

//! The callback bridge between the engine and the rest of the overlay.
//!
//! The engine calls slots on [`Bridge`] synchronously while an encode or
//! decode is in progress. Each slot translates the engine-provided values
//! into a log line, a state-change publication, an alert routed to the
//! owning conversation, or a delegated action the pipeline executes once the
//! engine call has returned.
use tracing::{debug, warn};

use sotto_core::{
    AccountId, Event, EventBus, Policy, ProtocolId, SessionIdentity, SessionSnapshot,
};

use crate::buffer::CorrelationBuffer;
use crate::engine::{ConvertDirection, EngineCode, MessageEvent, SmpEvent, TimerInterval};
use crate::registry::ConversationRegistry;
use crate::strings;
use crate::traits::{ChatHost, EngineCallbacks};

/// Work the engine requested from a callback slot.
///
/// Key generation and persistence are not executed inside the slot: the
/// engine is mutably borrowed for the duration of the pipeline call that
/// triggered the slot, so the request is queued and drained by the pipeline
/// right after the engine call returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DelegatedAction {
    GeneratePrivateKey {
        account: AccountId,
        protocol: ProtocolId,
    },
    GenerateInstanceTag {
        account: AccountId,
        protocol: ProtocolId,
    },
    WriteFingerprints,
}

/// Dispatcher object holding the bridge's state: the registry, the
/// correlation buffer, the event bus, the host handle and the queue of
/// pending delegated actions.
#[derive(Debug)]
pub(crate) struct Bridge<H> {
    pub(crate) policy: Policy,
    pub(crate) registry: ConversationRegistry,
    pub(crate) buffer: CorrelationBuffer,
    pub(crate) bus: EventBus,
    pub(crate) host: H,
    pending: Vec<DelegatedAction>,
}

impl<H: ChatHost> Bridge<H> {
    pub(crate) fn new(policy: Policy, host: H) -> Self {
        Self {
            policy,
            registry: ConversationRegistry::new(),
            buffer: CorrelationBuffer::new(),
            bus: EventBus::new(),
            host,
            pending: Vec::new(),
        }
    }

    pub(crate) fn log(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("{message}");
        self.bus.publish(Event::Log(message));
    }

    pub(crate) fn take_pending(&mut self) -> Vec<DelegatedAction> {
        std::mem::take(&mut self.pending)
    }

    /// Publishes the session's current state and recomputed trust level.
    pub(crate) fn publish_state(&self, session: &SessionSnapshot) {
        match self.registry.by_session(session) {
            Some(conversation) => self.bus.publish(Event::StateChanged {
                conversation: conversation.id(),
                session: session.clone(),
                trust: session.trust(),
            }),
            None => warn!(
                "no conversation for session {}, dropping state change",
                session.identity
            ),
        }
    }

    /// Shows an alert in the conversation that owns the session.
    pub(crate) fn alert(&mut self, session: &SessionSnapshot, text: &str) {
        match self.registry.by_session(session) {
            Some(conversation) => {
                let id = conversation.id();
                self.host.system_message(id, text);
            }
            None => warn!(
                "no conversation for session {}, dropping alert",
                session.identity
            ),
        }
    }
}

impl<H: ChatHost> EngineCallbacks for Bridge<H> {
    fn policy(&mut self, _session: &SessionSnapshot) -> Policy {
        self.policy
    }

    fn create_private_key(&mut self, account: &AccountId, protocol: &ProtocolId) {
        self.log(format!("engine requested private key for {account}/{protocol}"));
        self.pending.push(DelegatedAction::GeneratePrivateKey {
            account: account.clone(),
            protocol: protocol.clone(),
        });
    }

    fn is_logged_in(&mut self, _identity: &SessionIdentity) -> bool {
        // Presence is not tracked; the host delivers to offline peers anyway.
        true
    }

    fn inject_message(&mut self, identity: &SessionIdentity, message: &str) {
        self.log(format!("injecting protocol message ({} bytes)", message.len()));
        match self.registry.find(identity) {
            Some(conversation) => {
                let id = conversation.id();
                self.host.send_raw(id, message);
            }
            None => warn!("no conversation {identity} to inject into"),
        }
    }

    fn update_context_list(&mut self) {
        self.log("context list updated");
    }

    fn new_fingerprint(&mut self, identity: &SessionIdentity, fingerprint: &str) {
        self.log(format!("new fingerprint {fingerprint} for {identity}"));
    }

    fn write_fingerprints(&mut self) {
        self.pending.push(DelegatedAction::WriteFingerprints);
    }

    fn gone_secure(&mut self, session: &SessionSnapshot) {
        self.publish_state(session);
        self.alert(session, &strings::gone_secure(session.identity.peer.as_str()));
    }

    fn gone_insecure(&mut self, session: &SessionSnapshot) {
        // Engines are not known to fire this one.
        self.log(format!("session with {} gone insecure", session.identity));
    }

    fn still_secure(&mut self, session: &SessionSnapshot, is_reply: bool) {
        if is_reply {
            return;
        }
        self.publish_state(session);
        self.alert(session, &strings::still_secure(session.identity.peer.as_str()));
    }

    fn max_message_size(&mut self, session: &SessionSnapshot) -> usize {
        match session.identity.protocol.as_str() {
            // IRC servers truncate overlong lines, force fragmentation.
            "irc" => 400,
            _ => 0,
        }
    }

    fn account_display_name(
        &mut self,
        account: &AccountId,
        _protocol: &ProtocolId,
    ) -> Option<String> {
        self.log(format!("display name queried for {account}"));
        None
    }

    fn account_display_name_free(&mut self) {
        self.log("display name released");
    }

    fn received_symmetric_key(
        &mut self,
        session: &SessionSnapshot,
        usage: u32,
        _usage_data: &[u8],
    ) {
        self.log(format!(
            "symmetric key (use {usage}) from {} ignored",
            session.identity
        ));
    }

    fn error_message(&mut self, session: &SessionSnapshot, code: EngineCode) -> Option<String> {
        self.log(format!("error message queried for {}: {code}", session.identity));
        None
    }

    fn error_message_free(&mut self) {
        self.log("error message released");
    }

    fn resent_message_prefix(&mut self, session: &SessionSnapshot) -> Option<String> {
        self.log(format!("resend prefix queried for {}", session.identity));
        None
    }

    fn resent_message_prefix_free(&mut self) {
        self.log("resend prefix released");
    }

    fn handle_smp_event(
        &mut self,
        session: &SessionSnapshot,
        event: SmpEvent,
        progress_percent: u8,
        _question: Option<&str>,
    ) {
        self.log(format!(
            "smp event {event:?} ({progress_percent}%) for {}",
            session.identity
        ));
    }

    fn handle_message_event(&mut self, session: &SessionSnapshot, event: MessageEvent) {
        match event {
            MessageEvent::ReceivedNotInPrivate { message }
            | MessageEvent::ReceivedUnencrypted { message } => {
                if let Some(message) = message {
                    self.alert(session, &strings::received_unencrypted(&message));
                }
            }
            MessageEvent::ConnectionEnded => {
                self.alert(session, &strings::session_ended(session.identity.peer.as_str()));
                self.publish_state(session);
            }
            MessageEvent::HeartbeatReceived => {
                self.log(format!("heartbeat received from {}", session.identity.peer));
            }
            MessageEvent::HeartbeatSent => {
                self.log(format!("heartbeat sent to {}", session.identity.peer));
            }
            event => self.log(format!("message event: {event}")),
        }
    }

    fn create_instance_tag(&mut self, account: &AccountId, protocol: &ProtocolId) {
        self.log(format!("engine requested instance tag for {account}/{protocol}"));
        self.pending.push(DelegatedAction::GenerateInstanceTag {
            account: account.clone(),
            protocol: protocol.clone(),
        });
    }

    fn convert_message(
        &mut self,
        _session: &SessionSnapshot,
        direction: ConvertDirection,
        _message: &str,
    ) {
        self.log(format!("convert ({direction:?}) skipped"));
    }

    fn convert_message_free(&mut self) {
        self.log("converted message released");
    }

    fn timer_control(&mut self, interval: TimerInterval) {
        self.log(format!("timer request ignored: {interval:?}"));
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use sotto_core::{
        Conversation, ConversationId, Event, MessageState, Policy, SessionSnapshot, TrustLevel,
    };

    use super::{Bridge, DelegatedAction};
    use crate::engine::MessageEvent;
    use crate::test_utils::{RecordingHost, identity};
    use crate::traits::EngineCallbacks;

    fn bridge_with_conversation() -> Bridge<RecordingHost> {
        let mut bridge = Bridge::new(Policy::Opportunistic, RecordingHost::default());
        bridge.registry.register(Conversation::new(
            ConversationId(1),
            identity("bob@example.org"),
        ));
        bridge
    }

    fn encrypted_session() -> SessionSnapshot {
        SessionSnapshot {
            identity: identity("bob@example.org"),
            state: MessageState::Encrypted,
            verified: true,
        }
    }

    #[test]
    fn gone_secure_publishes_state_and_alerts_the_conversation() {
        let mut bridge = bridge_with_conversation();
        let mut events = bridge.bus.subscribe();

        bridge.gone_secure(&encrypted_session());

        assert_matches!(
            events.try_recv(),
            Ok(Event::StateChanged { conversation, trust, .. }) => {
                assert_eq!(conversation, ConversationId(1));
                assert_eq!(trust, TrustLevel::Private);
            }
        );
        assert_eq!(bridge.host.system.len(), 1);
        assert_eq!(bridge.host.system[0].0, ConversationId(1));
    }

    #[test]
    fn still_secure_reply_side_stays_silent() {
        let mut bridge = bridge_with_conversation();
        let mut events = bridge.bus.subscribe();

        bridge.still_secure(&encrypted_session(), true);

        assert!(events.try_recv().is_err());
        assert!(bridge.host.system.is_empty());
    }

    #[test]
    fn inject_message_routes_through_the_registry() {
        let mut bridge = bridge_with_conversation();

        bridge.inject_message(&identity("bob@example.org"), "?OTRv23?");

        assert_eq!(
            bridge.host.sent,
            vec![(ConversationId(1), "?OTRv23?".to_string())]
        );
    }

    #[test]
    fn inject_message_for_unknown_peer_is_dropped() {
        let mut bridge = bridge_with_conversation();

        bridge.inject_message(&identity("mallory@example.org"), "?OTRv23?");

        assert!(bridge.host.sent.is_empty());
    }

    #[test]
    fn key_management_slots_queue_delegated_actions() {
        let mut bridge = bridge_with_conversation();
        let id = identity("bob@example.org");

        bridge.create_private_key(&id.account, &id.protocol);
        bridge.write_fingerprints();

        assert_eq!(
            bridge.take_pending(),
            vec![
                DelegatedAction::GeneratePrivateKey {
                    account: id.account,
                    protocol: id.protocol,
                },
                DelegatedAction::WriteFingerprints,
            ]
        );
        assert!(bridge.take_pending().is_empty());
    }

    #[test]
    fn connection_ended_event_alerts_and_republishes_state() {
        let mut bridge = bridge_with_conversation();
        let mut events = bridge.bus.subscribe();
        let session = SessionSnapshot {
            state: MessageState::Finished,
            ..encrypted_session()
        };

        bridge.handle_message_event(&session, MessageEvent::ConnectionEnded);

        assert_eq!(bridge.host.system.len(), 1);
        assert_matches!(
            events.try_recv(),
            Ok(Event::StateChanged { trust: TrustLevel::Finished, .. })
        );
    }

    #[test]
    fn heartbeats_only_log() {
        let mut bridge = bridge_with_conversation();
        let mut events = bridge.bus.subscribe();

        bridge.handle_message_event(&encrypted_session(), MessageEvent::HeartbeatReceived);
        bridge.handle_message_event(&encrypted_session(), MessageEvent::HeartbeatSent);

        assert_matches!(events.try_recv(), Ok(Event::Log(_)));
        assert_matches!(events.try_recv(), Ok(Event::Log(_)));
        assert!(bridge.host.system.is_empty());
    }

    #[test]
    fn message_size_cap_depends_on_the_network() {
        let mut bridge = bridge_with_conversation();
        let mut irc = encrypted_session();
        irc.identity.protocol = "IRC".into();

        assert_eq!(bridge.max_message_size(&irc), 400);
        assert_eq!(bridge.max_message_size(&encrypted_session()), 0);
    }
}
