// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sotto-core` provides the framework-independent data types used by the
//! sotto encryption overlay: normalized chat identities, conversation
//! handles, message wrappers with cooperative cancellation, session state and
//! trust classification, the encryption policy and the typed event bus.
//!
//! Nothing in this crate talks to a cryptographic engine or a chat client.
//! The active machinery lives in `sotto-overlay`.
pub mod conversation;
pub mod event;
pub mod identity;
pub mod message;
pub mod policy;
pub mod session;
pub mod trust;

pub use conversation::{Conversation, ConversationId};
pub use event::{Event, EventBus};
pub use identity::{AccountId, PeerId, ProtocolId, SessionIdentity};
pub use message::{InboundMessage, OutboundMessage};
pub use policy::Policy;
pub use session::{MessageState, SessionSnapshot};
pub use trust::TrustLevel;
