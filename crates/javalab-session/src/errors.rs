//! Session error types.

/// Errors that can occur while establishing or using a session.
///
/// Frame-level problems never appear here: malformed or unrecognized frames
/// are logged and dropped by the dispatcher so a bad frame cannot take down
/// a running session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the request.
    #[error("token request failed ({status}): {message}")]
    TokenRequest {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        message: String,
    },

    /// The WebSocket transport failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A send was attempted before the channel opened or after it closed.
    #[error("not connected")]
    NotConnected,

    /// `connect` was called while a live socket already exists.
    #[error("session already has a live connection")]
    AlreadyConnected,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
