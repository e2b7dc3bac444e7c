//! The session manager.

use tokio::task::JoinHandle;

use crate::collaborators::Collaborators;
use crate::descriptor::SessionDescriptor;
use crate::dispatch::{CONNECTION_ERROR_MESSAGE, MessageDispatcher};
use crate::errors::SessionError;
use crate::socket::{CloseInfo, SessionSocket, SocketSender};
use crate::token::TokenRequester;

/// One end-to-end attempt to run remote code and stream its output back.
///
/// Composes the token requester, the socket adapter, and the dispatcher:
/// `connect` exchanges the descriptor for a token, opens the socket with the
/// token as a credential parameter, and moves a [`MessageDispatcher`] onto a
/// single consumer task that handles every socket event in order. All
/// user-facing text — including connection failures — flows through the
/// injected console sink.
pub struct JavabuilderSession {
    javabuilder_url: String,
    token_requester: TokenRequester,
    descriptor: SessionDescriptor,
    collaborators: Collaborators,
    diagnostic: bool,
    socket: Option<SessionSocket>,
    pump: Option<JoinHandle<()>>,
}

impl JavabuilderSession {
    /// Create an unconnected session.
    pub fn new(
        javabuilder_url: impl Into<String>,
        token_requester: TokenRequester,
        descriptor: SessionDescriptor,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            javabuilder_url: javabuilder_url.into(),
            token_requester,
            descriptor,
            collaborators,
            diagnostic: false,
            socket: None,
            pump: None,
        }
    }

    /// Surface `DEBUG` frames on the console (diagnostic/local contexts).
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: bool) -> Self {
        self.diagnostic = diagnostic;
        self
    }

    /// Request a token and open the connection.
    ///
    /// On token failure the session writes one generic connection-failure
    /// line to the sink and stops: no socket is created and nothing retries.
    /// At most one live socket exists per session; reconnecting is allowed
    /// only after the previous channel has died.
    #[tracing::instrument(skip_all, fields(channel_id = %self.descriptor.channel_id))]
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.socket.as_ref().is_some_and(SessionSocket::is_open) {
            return Err(SessionError::AlreadyConnected);
        }

        let token = match self.token_requester.request_token(&self.descriptor).await {
            Ok(token) => token,
            Err(err) => {
                self.collaborators.sink.write_line(CONNECTION_ERROR_MESSAGE);
                tracing::error!(%err, "javabuilder token request failed");
                return Err(err);
            }
        };

        let url = format!("{}?Authorization={}", self.javabuilder_url, token.as_str());
        let (socket, mut events) = match SessionSocket::connect(&url).await {
            Ok(connected) => connected,
            Err(err) => {
                self.collaborators.sink.write_line(CONNECTION_ERROR_MESSAGE);
                tracing::error!(%err, "javabuilder connection failed");
                return Err(err);
            }
        };

        let mut dispatcher = MessageDispatcher::new(self.collaborators.clone(), self.diagnostic);
        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                dispatcher.handle_event(event);
            }
        });

        self.socket = Some(socket);
        self.pump = Some(pump);
        Ok(())
    }

    /// Whether a live socket exists.
    pub fn is_connected(&self) -> bool {
        self.socket.as_ref().is_some_and(SessionSocket::is_open)
    }

    /// Forward one opaque payload to the backend.
    ///
    /// Fails fast with [`SessionError::NotConnected`] before `connect` or
    /// after the channel closes; nothing is queued.
    pub fn send_message(&self, payload: &str) -> Result<(), SessionError> {
        self.socket
            .as_ref()
            .ok_or(SessionError::NotConnected)?
            .send(payload)
    }

    /// A cloneable outbound handle with the same send contract, for
    /// embedders that hold the session mutably elsewhere.
    pub fn sender(&self) -> Result<SocketSender, SessionError> {
        self.socket
            .as_ref()
            .map(SessionSocket::sender)
            .ok_or(SessionError::NotConnected)
    }

    /// Wait until the channel has died and every event has been handled.
    pub async fn run_to_close(&mut self) {
        if let Some(pump) = self.pump.take() {
            if let Err(err) = pump.await {
                tracing::error!(%err, "session event consumer failed");
            }
        }
    }

    /// Close metadata from the last connection, once its channel has died.
    pub fn close_info(&self) -> Option<CloseInfo> {
        self.socket.as_ref().and_then(SessionSocket::close_info)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
