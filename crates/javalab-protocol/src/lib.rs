//! # javalab-protocol
//!
//! Wire types for the Javabuilder WebSocket protocol.
//!
//! Javabuilder delivers one JSON object per WebSocket frame, shaped as
//! `{"type": "...", "value": ...}`. This crate owns:
//! - [`MessageType`]: the fixed message-type enumeration with exact wire
//!   strings (`STATUS`, `SYSTEM_OUT`, `EXCEPTION`, `DEBUG`, plus the
//!   mini-app signal types)
//! - [`RunStatus`]: the status keywords carried by `STATUS` messages
//! - [`InboundMessage::parse`]: classification of a raw frame into a typed
//!   message, with unknown types skipped rather than rejected so newer
//!   backends keep working against older clients
//!
//! No I/O lives here; the session crate owns the connection.

#![deny(unsafe_code)]

pub mod errors;
pub mod messages;
pub mod status;

pub use errors::ProtocolError;
pub use messages::{Envelope, InboundMessage, MessageType, STATUS_MESSAGE_PREFIX, SignalKind};
pub use status::RunStatus;
