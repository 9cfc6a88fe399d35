// SPDX-License-Identifier: MIT OR Apache-2.0

use sotto_core::ConversationId;
use thiserror::Error;

use crate::engine::EngineCode;

/// Errors surfaced by overlay operations.
///
/// None of these are fatal to the process. When a pipeline operation returns
/// an error the affected message has already been cancelled; the error value
/// is the out-of-band report, raw engine codes never reach the user.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// The engine rejected an operation with a nonzero status.
    #[error(transparent)]
    Engine(#[from] EngineCode),

    /// A send was attempted for a conversation the host never announced.
    /// Indicates a host/overlay desynchronization bug.
    #[error("sending to an unknown conversation (id {0})")]
    UnknownConversation(ConversationId),

    /// A key-store file could not be prepared or processed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Failure while touching one of the engine's store files.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("key store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("key store operation failed: {0}")]
    Engine(EngineCode),
}
