// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value types crossing the engine boundary.
//!
//! The engine is treated as a black box which owns all cryptographic session
//! state. Everything here is plain data passed by value across that boundary.
use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// Nonzero status code returned by a failing engine operation.
///
/// The numeric value is engine-specific and only ever logged or reported, it
/// is never shown to the user or interpreted by the overlay.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("engine returned code {0}")]
pub struct EngineCode(pub i32);

/// Selector for one of possibly several simultaneous sessions with the same
/// peer. The pipeline always lets the engine pick (`Best`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstanceTag {
    /// Let the engine choose the most recently active instance.
    #[default]
    Best,

    /// The master context for the peer.
    Master,

    /// An explicit engine-assigned instance tag.
    Tag(u32),
}

/// Auxiliary protocol marker attached to a decoded message.
///
/// These correspond to protocol records the engine found piggy-backed on the
/// incoming message. Only `Disconnected` has behavioral meaning for the
/// pipeline; everything else is logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxMarker {
    /// The peer ended the encrypted session.
    Disconnected,

    /// Any other marker type, carried by its raw record type.
    Other(u16),
}

/// Result payload of an incoming-transform call.
///
/// Returned alongside the status code rather than inside a `Result` because
/// the engine may attach markers (notably [`AuxMarker::Disconnected`]) to a
/// message it also rejects, and those still need to be acted upon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Replacement display text, `None` when the engine left the message
    /// untouched.
    pub replacement: Option<String>,

    /// Auxiliary protocol markers found on the message.
    pub markers: Vec<AuxMarker>,
}

/// Protocol event reported through the `handle_message_event` callback slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageEvent {
    /// The policy requires encryption but no session is established.
    EncryptionRequired,

    /// An unencrypted message arrived while a private session was expected.
    ReceivedNotInPrivate { message: Option<String> },

    /// An unencrypted message arrived out of the blue.
    ReceivedUnencrypted { message: Option<String> },

    /// A protocol heartbeat arrived from the peer.
    HeartbeatReceived,

    /// A protocol heartbeat was sent to the peer.
    HeartbeatSent,

    /// The peer ended the private session.
    ConnectionEnded,

    /// Any other event, carried by its raw engine code.
    Other(u32),
}

impl Display for MessageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EncryptionRequired => write!(f, "encryption required"),
            Self::ReceivedNotInPrivate { .. } => write!(f, "received message not in private"),
            Self::ReceivedUnencrypted { .. } => write!(f, "received unencrypted message"),
            Self::HeartbeatReceived => write!(f, "heartbeat received"),
            Self::HeartbeatSent => write!(f, "heartbeat sent"),
            Self::ConnectionEnded => write!(f, "connection ended by peer"),
            Self::Other(code) => write!(f, "message event {code}"),
        }
    }
}

/// Socialist-millionaire verification event. The overlay has no SMP user
/// interface and logs these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmpEvent {
    AskForSecret,
    AskForAnswer,
    InProgress,
    Success,
    Failure,
    Abort,
    Cheated,
    Error,
}

/// Direction of a message offered to the `convert_message` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertDirection {
    Sending,
    Receiving,
}

/// Timer request issued through the `timer_control` slot. `None` stops the
/// timer. The overlay does not run timers and logs the request.
pub type TimerInterval = Option<Duration>;
