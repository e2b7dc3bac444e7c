//! The WebSocket transport adapter.
//!
//! [`SessionSocket`] owns the duplex channel to the backend and performs no
//! interpretation of frame contents — classification is the dispatcher's
//! job. One IO task per socket forwards inbound text frames as
//! [`SocketEvent`]s in arrival order onto a single consumer; outbound
//! payloads flow through an unbounded channel with no backpressure, matching
//! the transport's own buffering.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::errors::SessionError;

/// Close code reported when the channel died without a close handshake,
/// mirroring browser WebSocket behavior.
const ABNORMAL_CLOSURE: u16 = 1006;
/// Close code reported for a close frame that carried no status code.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Edge-triggered events emitted by the socket, consumed one at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketEvent {
    /// The channel is ready; always the first event.
    Open,
    /// One inbound text frame, verbatim.
    Message(String),
    /// The channel closed; always the last event.
    Close {
        /// Close code (1006 when the channel died without a handshake).
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
        /// Whether the close handshake completed.
        was_clean: bool,
    },
    /// The transport reported an error. Followed by an unclean `Close`.
    Error(String),
}

/// Close metadata retained for inspection after the channel dies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code.
    pub code: u16,
    /// Close reason, possibly empty.
    pub reason: String,
    /// Whether the close handshake completed.
    pub was_clean: bool,
}

/// A cloneable outbound handle with the socket's send contract.
#[derive(Clone, Debug)]
pub struct SocketSender {
    tx: mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
}

impl SocketSender {
    /// Whether the channel is still open.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Send one opaque payload. Fails fast with
    /// [`SessionError::NotConnected`] once the channel is no longer open;
    /// nothing is queued for later.
    pub fn send(&self, payload: &str) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::NotConnected);
        }
        self.tx
            .send(payload.to_string())
            .map_err(|_| SessionError::NotConnected)
    }
}

/// The connected WebSocket channel.
#[derive(Debug)]
pub struct SessionSocket {
    sender: SocketSender,
    close_info: Arc<Mutex<Option<CloseInfo>>>,
}

impl SessionSocket {
    /// Open the channel and return the socket with its event receiver.
    ///
    /// Opening is asynchronous; the consumer learns of readiness from the
    /// [`SocketEvent::Open`] queued as the first event.
    #[tracing::instrument(skip_all)]
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SocketEvent>), SessionError> {
        let (stream, _response) = connect_async(url).await?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(true));
        let close_info = Arc::new(Mutex::new(None));

        let _ = events_tx.send(SocketEvent::Open);
        drop(tokio::spawn(run_io(
            stream,
            out_rx,
            events_tx,
            open.clone(),
            close_info.clone(),
        )));

        let socket = Self {
            sender: SocketSender { tx: out_tx, open },
            close_info,
        };
        Ok((socket, events_rx))
    }

    /// Whether the channel is still open.
    pub fn is_open(&self) -> bool {
        self.sender.is_open()
    }

    /// Send one opaque payload; see [`SocketSender::send`].
    pub fn send(&self, payload: &str) -> Result<(), SessionError> {
        self.sender.send(payload)
    }

    /// A cloneable outbound handle.
    pub fn sender(&self) -> SocketSender {
        self.sender.clone()
    }

    /// Close metadata, available once the channel has died.
    pub fn close_info(&self) -> Option<CloseInfo> {
        self.close_info.lock().clone()
    }
}

/// The single IO task: pumps outbound payloads into the stream and inbound
/// frames into the event queue until the channel dies, then records the
/// close metadata and emits the final `Close` event.
async fn run_io(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<SocketEvent>,
    open: Arc<AtomicBool>,
    close_info: Arc<Mutex<Option<CloseInfo>>>,
) {
    let mut observed: Option<CloseInfo> = None;
    loop {
        tokio::select! {
            payload = outbound.recv() => match payload {
                Some(text) => {
                    if let Err(err) = stream.send(Message::Text(text.into())).await {
                        let _ = events.send(SocketEvent::Error(err.to_string()));
                        break;
                    }
                }
                None => {
                    // Every sender is gone; initiate the close handshake.
                    let _ = stream.close(None).await;
                    break;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SocketEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    observed = Some(match frame {
                        Some(frame) => CloseInfo {
                            code: frame.code.into(),
                            reason: frame.reason.as_str().to_owned(),
                            was_clean: true,
                        },
                        None => CloseInfo {
                            code: NO_STATUS_RECEIVED,
                            reason: String::new(),
                            was_clean: true,
                        },
                    });
                }
                // Ping/pong are answered by the library; binary frames are
                // not part of this protocol.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = events.send(SocketEvent::Error(err.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    open.store(false, Ordering::SeqCst);
    let info = observed.unwrap_or(CloseInfo {
        code: ABNORMAL_CLOSURE,
        reason: String::new(),
        was_clean: false,
    });
    *close_info.lock() = Some(info.clone());
    let _ = events.send(SocketEvent::Close {
        code: info.code,
        reason: info.reason,
        was_clean: info.was_clean,
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
