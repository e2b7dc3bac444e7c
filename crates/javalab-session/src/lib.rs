//! # javalab-session
//!
//! Connection and session management for Javabuilder, the remote
//! code-execution backend.
//!
//! One [`JavabuilderSession`] drives one end-to-end run: it exchanges the
//! session descriptor for a short-lived access token, opens a WebSocket to
//! the backend with the token as a credential parameter, and routes every
//! inbound frame — program output, run-status transitions, exceptions,
//! mini-app signals — to injected collaborators. All user-facing text flows
//! through a [`ConsoleSink`]; nothing here touches ambient state.
//!
//! # Components
//!
//! - [`TokenRequester`]: one GET against the token endpoint, no retry
//! - [`SessionSocket`]: the transport adapter; emits [`SocketEvent`]s onto a
//!   single consumer and sends opaque outbound payloads
//! - [`MessageDispatcher`]: classifies frames and routes them
//! - [`RunStatusTracker`]: the run lifecycle state machine driven by
//!   `STATUS` messages
//! - [`JavabuilderSession`]: composes the above
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use javalab_session::{
//!     Collaborators, JavabuilderSession, LoggingExceptionHandler, SessionDescriptor,
//!     TokenRequester,
//! };
//!
//! # async fn run(sink: Arc<dyn javalab_session::ConsoleSink>,
//! #              run_state: Arc<dyn javalab_session::RunState>) {
//! let descriptor = SessionDescriptor::new("abc123", "https://studio.example/p/abc123", "v1", "42");
//! let collaborators = Collaborators {
//!     sink,
//!     run_state,
//!     exceptions: Arc::new(LoggingExceptionHandler),
//!     mini_app: None,
//! };
//! let mut session = JavabuilderSession::new(
//!     "wss://javabuilder.example",
//!     TokenRequester::new("https://studio.example/javabuilder/access_token"),
//!     descriptor,
//!     collaborators,
//! );
//! session.connect().await.unwrap();
//! session.run_to_close().await;
//! # }
//! ```

#![deny(unsafe_code)]

pub mod collaborators;
pub mod descriptor;
pub mod dispatch;
pub mod errors;
pub mod session;
pub mod socket;
pub mod token;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::{
    Collaborators, ConsoleSink, ExceptionHandler, LoggingExceptionHandler, MiniApp, RunState,
};
pub use descriptor::SessionDescriptor;
pub use dispatch::{CONNECTION_ERROR_MESSAGE, MessageDispatcher};
pub use errors::SessionError;
pub use session::JavabuilderSession;
pub use socket::{CloseInfo, SessionSocket, SocketEvent, SocketSender};
pub use token::{AccessToken, TokenRequester};
pub use tracker::{RunPhase, RunStatusTracker};
