// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use sotto_core::{
    AccountId, Conversation, ConversationId, MessageState, PeerId, Policy, ProtocolId,
    SessionIdentity, SessionSnapshot,
};

use crate::engine::{Decoded, EngineCode, InstanceTag, MessageEvent};
use crate::traits::{ChatHost, EngineCallbacks, ProtocolEngine};

pub fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Identity triple for tests, always on alice's xmpp account.
pub fn identity(peer: &str) -> SessionIdentity {
    SessionIdentity::new(
        AccountId::new("alice@example.org"),
        ProtocolId::new("xmpp"),
        PeerId::new(peer),
    )
}

pub fn conversation(id: u64, peer: &str) -> Conversation {
    Conversation::new(ConversationId(id), identity(peer))
}

/// Host double recording everything the overlay pushes at it.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub sent: Vec<(ConversationId, String)>,
    pub system: Vec<(ConversationId, String)>,
}

impl ChatHost for RecordingHost {
    fn send_raw(&mut self, conversation: ConversationId, text: &str) {
        self.sent.push((conversation, text.to_string()));
    }

    fn system_message(&mut self, conversation: ConversationId, text: &str) {
        self.system.push((conversation, text.to_string()));
    }
}

/// Callback invocation a [`ScriptedEngine`] performs mid-call, to exercise
/// the bridge's reentrant slots the way a real engine would.
#[derive(Clone, Debug)]
pub enum Effect {
    GoneSecure,
    StillSecure { is_reply: bool },
    Inject(String),
    RequestPrivateKey,
    RequestInstanceTag,
    RequestFingerprintWrite,
    QueryPolicy,
    Report(MessageEvent),
}

/// One scripted reaction to an `encode_outgoing` call.
#[derive(Clone, Debug, Default)]
pub struct EncodeStep {
    pub effects: Vec<Effect>,
    pub result: Option<Result<Option<String>, EngineCode>>,
}

impl EncodeStep {
    /// Replace the plaintext with `wire`.
    pub fn replace(wire: &str) -> Self {
        Self {
            effects: Vec::new(),
            result: Some(Ok(Some(wire.to_string()))),
        }
    }

    /// Leave the message untouched.
    pub fn passthrough() -> Self {
        Self {
            effects: Vec::new(),
            result: Some(Ok(None)),
        }
    }

    /// Consume the message internally (empty replacement).
    pub fn consumed() -> Self {
        Self {
            effects: Vec::new(),
            result: Some(Ok(Some(String::new()))),
        }
    }

    pub fn error(code: i32) -> Self {
        Self {
            effects: Vec::new(),
            result: Some(Err(EngineCode(code))),
        }
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }
}

/// One scripted reaction to a `decode_incoming` call.
#[derive(Clone, Debug, Default)]
pub struct DecodeStep {
    pub effects: Vec<Effect>,
    pub status: Option<Result<(), EngineCode>>,
    pub decoded: Decoded,
}

impl DecodeStep {
    pub fn replace(display: &str) -> Self {
        Self {
            decoded: Decoded {
                replacement: Some(display.to_string()),
                markers: Vec::new(),
            },
            ..Self::default()
        }
    }

    pub fn error(code: i32) -> Self {
        Self {
            status: Some(Err(EngineCode(code))),
            ..Self::default()
        }
    }

    pub fn with_markers(mut self, markers: Vec<crate::engine::AuxMarker>) -> Self {
        self.decoded.markers = markers;
        self
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }
}

/// Engine double driven by per-call scripts.
///
/// Unscripted calls pass messages through untouched. Session snapshots are
/// served from the `states` map, defaulting to an unkeyed plaintext session.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub encode_script: VecDeque<EncodeStep>,
    pub decode_script: VecDeque<DecodeStep>,
    pub states: HashMap<SessionIdentity, (MessageState, bool)>,
    pub keyed: HashSet<(AccountId, ProtocolId)>,

    pub initialized: bool,
    pub shut_down: bool,
    pub keys_read_from: Vec<PathBuf>,
    pub fingerprints_read_from: Vec<PathBuf>,
    pub fingerprints_written_to: Vec<PathBuf>,
    pub generated_keys: Vec<(AccountId, ProtocolId)>,
    pub generated_tags: Vec<(AccountId, ProtocolId)>,
    pub ended_sessions: Vec<SessionIdentity>,
    pub policy_answers: Vec<Policy>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, identity: &SessionIdentity) -> SessionSnapshot {
        let (state, verified) = self
            .states
            .get(identity)
            .copied()
            .unwrap_or((MessageState::Plaintext, false));
        SessionSnapshot {
            identity: identity.clone(),
            state,
            verified,
        }
    }

    fn apply_effects(
        &mut self,
        effects: Vec<Effect>,
        callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
    ) {
        let session = self.snapshot(identity);
        for effect in effects {
            match effect {
                Effect::GoneSecure => callbacks.gone_secure(&session),
                Effect::StillSecure { is_reply } => callbacks.still_secure(&session, is_reply),
                Effect::Inject(message) => callbacks.inject_message(identity, &message),
                Effect::RequestPrivateKey => {
                    callbacks.create_private_key(&identity.account, &identity.protocol)
                }
                Effect::RequestInstanceTag => {
                    callbacks.create_instance_tag(&identity.account, &identity.protocol)
                }
                Effect::RequestFingerprintWrite => callbacks.write_fingerprints(),
                Effect::QueryPolicy => {
                    let answer = callbacks.policy(&session);
                    self.policy_answers.push(answer);
                }
                Effect::Report(event) => callbacks.handle_message_event(&session, event),
            }
        }
    }
}

impl ProtocolEngine for ScriptedEngine {
    fn init(&mut self) -> Result<(), EngineCode> {
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }

    fn encode_outgoing(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
        _tag: InstanceTag,
        _plaintext: &str,
    ) -> Result<Option<String>, EngineCode> {
        let step = self.encode_script.pop_front().unwrap_or_default();
        self.apply_effects(step.effects, callbacks, identity);
        step.result.unwrap_or(Ok(None))
    }

    fn decode_incoming(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
        _ciphertext: &str,
    ) -> (Result<(), EngineCode>, Decoded) {
        let step = self.decode_script.pop_front().unwrap_or_default();
        self.apply_effects(step.effects, callbacks, identity);
        (step.status.unwrap_or(Ok(())), step.decoded)
    }

    fn session(&mut self, identity: &SessionIdentity, _tag: InstanceTag) -> SessionSnapshot {
        self.snapshot(identity)
    }

    fn end_session(
        &mut self,
        _callbacks: &mut dyn EngineCallbacks,
        identity: &SessionIdentity,
        _tag: InstanceTag,
    ) {
        self.states
            .insert(identity.clone(), (MessageState::Plaintext, false));
        self.ended_sessions.push(identity.clone());
    }

    fn query_message(&self, account: &AccountId, _policy: Policy) -> String {
        format!("?OTRv23?\n{account} has requested a private conversation.")
    }

    fn key_fingerprint(&self, account: &AccountId, protocol: &ProtocolId) -> Option<String> {
        self.keyed
            .contains(&(account.clone(), protocol.clone()))
            .then(|| "31855F85 8FCC4C63 2D78D5BA A68E28A5 2B6D7CC3".to_string())
    }

    fn read_private_keys(&mut self, path: &Path) -> Result<(), EngineCode> {
        self.keys_read_from.push(path.to_path_buf());
        Ok(())
    }

    fn read_fingerprints(&mut self, path: &Path) -> Result<(), EngineCode> {
        self.fingerprints_read_from.push(path.to_path_buf());
        Ok(())
    }

    fn write_fingerprints(&mut self, path: &Path) -> Result<(), EngineCode> {
        self.fingerprints_written_to.push(path.to_path_buf());
        Ok(())
    }

    fn generate_private_key(
        &mut self,
        _path: &Path,
        account: &AccountId,
        protocol: &ProtocolId,
    ) -> Result<(), EngineCode> {
        self.keyed.insert((account.clone(), protocol.clone()));
        self.generated_keys.push((account.clone(), protocol.clone()));
        Ok(())
    }

    fn generate_instance_tag(
        &mut self,
        _path: &Path,
        account: &AccountId,
        protocol: &ProtocolId,
    ) -> Result<(), EngineCode> {
        self.generated_tags.push((account.clone(), protocol.clone()));
        Ok(())
    }
}
