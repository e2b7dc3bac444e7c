//! Protocol error types.

use crate::messages::MessageType;

/// Errors produced while classifying an inbound frame.
///
/// None of these are fatal to a session: the dispatcher logs and drops the
/// frame. Unknown message types are not errors at all — `parse` returns
/// `Ok(None)` for them.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame parsed but carried no string `type` field.
    #[error("frame has no string `type` field")]
    MissingType,

    /// A known message type carried a wrong-shaped value.
    #[error("invalid payload for {message_type}: expected {expected}")]
    InvalidPayload {
        /// The declared message type.
        message_type: MessageType,
        /// What the payload should have been.
        expected: &'static str,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
