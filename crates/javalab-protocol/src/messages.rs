//! The inbound message envelope and its classification.
//!
//! Wire format (one JSON object per frame):
//! ```json
//! {"type": "SYSTEM_OUT", "value": "Hello World"}
//! ```
//!
//! `type` is an open string on the wire: frames with a type this client does
//! not recognize are skipped, never rejected, so the backend can introduce
//! new types without breaking deployed clients.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProtocolError;

/// Prefix prepended to every status line the client derives from the
/// run-status protocol, distinguishing them from program output.
pub const STATUS_MESSAGE_PREFIX: &str = "[JAVALAB]";

/// All message types this client understands.
///
/// Each variant serializes to the exact wire string Javabuilder sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Run lifecycle status; `value` is a [`RunStatus`](crate::RunStatus)
    /// keyword.
    #[serde(rename = "STATUS")]
    Status,
    /// One line of program stdout; `value` is forwarded verbatim.
    #[serde(rename = "SYSTEM_OUT")]
    SystemOut,
    /// A structured exception record from the user program.
    #[serde(rename = "EXCEPTION")]
    Exception,
    /// Backend diagnostics, only surfaced in diagnostic contexts.
    #[serde(rename = "DEBUG")]
    Debug,
    /// Signal for the Neighborhood mini-app.
    #[serde(rename = "NEIGHBORHOOD")]
    Neighborhood,
    /// Signal for the Theater mini-app.
    #[serde(rename = "THEATER")]
    Theater,
}

impl MessageType {
    /// Look up a wire string, `None` for types unknown to this client.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "STATUS" => Some(Self::Status),
            "SYSTEM_OUT" => Some(Self::SystemOut),
            "EXCEPTION" => Some(Self::Exception),
            "DEBUG" => Some(Self::Debug),
            "NEIGHBORHOOD" => Some(Self::Neighborhood),
            "THEATER" => Some(Self::Theater),
            _ => None,
        }
    }

    /// The exact wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "STATUS",
            Self::SystemOut => "SYSTEM_OUT",
            Self::Exception => "EXCEPTION",
            Self::Debug => "DEBUG",
            Self::Neighborhood => "NEIGHBORHOOD",
            Self::Theater => "THEATER",
        }
    }

    /// Whether this type is reserved for an embedded mini-app.
    pub fn is_signal(self) -> bool {
        matches!(self, Self::Neighborhood | Self::Theater)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The message types forwarded to an embedded mini-app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    /// Neighborhood painting signals.
    Neighborhood,
    /// Theater playback signals.
    Theater,
}

/// The raw `{type, value}` frame shape.
///
/// `message_type` stays an open string here; classification into
/// [`MessageType`] happens in [`InboundMessage::parse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Declared message type.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Type-dependent payload; absent values read as `null`.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

/// A classified inbound message, constructed per frame and consumed
/// immediately by the dispatcher.
///
/// `Exception` and `Signal` carry the full record because their consumers
/// (the exception-handling collaborator and the mini-app) receive the whole
/// record, not just `value`.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundMessage {
    /// A run-status keyword.
    Status(String),
    /// One line of program output, verbatim.
    SystemOut(String),
    /// The full exception record.
    Exception(Value),
    /// A backend diagnostic line.
    Debug(String),
    /// A mini-app signal with the full record.
    Signal {
        /// Which mini-app the signal addresses.
        kind: SignalKind,
        /// The full `{type, value}` record.
        record: Value,
    },
}

impl InboundMessage {
    /// Classify one raw frame.
    ///
    /// Returns `Ok(None)` when the declared type is unknown to this client
    /// (skip the frame), and `Err` when the frame is not valid JSON or a
    /// known type carries a wrong-shaped value.
    pub fn parse(raw: &str) -> Result<Option<Self>, ProtocolError> {
        let record: Value = serde_json::from_str(raw)?;
        let type_str = record
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;
        let Some(message_type) = MessageType::from_wire(type_str) else {
            return Ok(None);
        };

        let message = match message_type {
            MessageType::Status => Self::Status(expect_string(message_type, &record)?),
            MessageType::SystemOut => Self::SystemOut(expect_string(message_type, &record)?),
            MessageType::Debug => Self::Debug(expect_string(message_type, &record)?),
            MessageType::Exception => Self::Exception(record),
            MessageType::Neighborhood => Self::Signal {
                kind: SignalKind::Neighborhood,
                record,
            },
            MessageType::Theater => Self::Signal {
                kind: SignalKind::Theater,
                record,
            },
        };
        Ok(Some(message))
    }
}

/// Pull a string `value` out of a record, or fail with the offending type.
fn expect_string(message_type: MessageType, record: &Value) -> Result<String, ProtocolError> {
    record
        .get("value")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ProtocolError::InvalidPayload {
            message_type,
            expected: "a string value",
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
