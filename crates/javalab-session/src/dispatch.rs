//! Inbound frame classification and routing.

use javalab_protocol::InboundMessage;

use crate::collaborators::Collaborators;
use crate::socket::SocketEvent;
use crate::tracker::RunStatusTracker;

/// Generic user-facing line for connection trouble, both token-request
/// failures and transport errors. Detail goes to the log, never the console.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "We hit an error connecting to our server. Try again.";

/// Classifies each inbound frame by declared type and routes it to the
/// correct collaborator. Owns the run-status tracker.
///
/// Dispatch happens once per frame, in arrival order, on the session's
/// single consumer task; no two dispatches ever run concurrently for one
/// session.
pub struct MessageDispatcher {
    collaborators: Collaborators,
    tracker: RunStatusTracker,
    diagnostic: bool,
}

impl MessageDispatcher {
    /// Create a dispatcher.
    ///
    /// `diagnostic` gates `DEBUG` frames: they reach the console only in a
    /// diagnostic/local context, replacing the web client's hostname check
    /// with explicit configuration.
    pub fn new(collaborators: Collaborators, diagnostic: bool) -> Self {
        Self {
            collaborators,
            tracker: RunStatusTracker::new(),
            diagnostic,
        }
    }

    /// The run-status tracker, for phase inspection.
    pub fn tracker(&self) -> &RunStatusTracker {
        &self.tracker
    }

    /// Handle one socket event on the consumer task.
    pub fn handle_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Open => {
                tracing::info!("javabuilder connection open");
                if let Some(app) = &self.collaborators.mini_app {
                    app.on_compile();
                }
            }
            SocketEvent::Message(raw) => self.dispatch(&raw),
            SocketEvent::Close {
                code,
                reason,
                was_clean,
            } => {
                // Informational only. A close without a prior EXITED status
                // is not a program exit; the tracker keeps its phase.
                tracing::info!(code, %reason, was_clean, "javabuilder connection closed");
            }
            SocketEvent::Error(detail) => {
                self.collaborators.sink.write_line(CONNECTION_ERROR_MESSAGE);
                tracing::error!(%detail, "javabuilder connection error");
            }
        }
    }

    /// Classify and route one raw frame.
    ///
    /// Malformed frames are logged and dropped, never fatal. Frames with a
    /// type unknown to this client are skipped silently — the backend may
    /// speak a newer protocol.
    pub fn dispatch(&mut self, raw: &str) {
        match InboundMessage::parse(raw) {
            Ok(Some(message)) => self.route(message),
            Ok(None) => tracing::debug!("skipping frame with unrecognized type"),
            Err(err) => tracing::warn!(%err, "dropping malformed frame"),
        }
    }

    fn route(&mut self, message: InboundMessage) {
        let collaborators = &self.collaborators;
        match message {
            InboundMessage::Status(keyword) => self.tracker.handle_status(
                &keyword,
                collaborators.sink.as_ref(),
                collaborators.run_state.as_ref(),
                collaborators.mini_app.as_deref(),
            ),
            InboundMessage::SystemOut(text) => collaborators.sink.write_line(&text),
            InboundMessage::Exception(record) => collaborators
                .exceptions
                .handle(&record, collaborators.sink.as_ref()),
            InboundMessage::Debug(text) => {
                if self.diagnostic {
                    collaborators.sink.write_line(&text);
                }
            }
            InboundMessage::Signal { kind, record } => {
                if let Some(app) = &collaborators.mini_app {
                    app.handle_signal(&record);
                } else {
                    tracing::debug!(?kind, "dropping signal with no mini-app attached");
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::Value;

    use super::*;
    use crate::collaborators::{ConsoleSink, ExceptionHandler};
    use crate::testing::{RecordingConsole, RecordingMiniApp};
    use crate::tracker::RunPhase;

    struct RecordingExceptionHandler {
        records: Mutex<Vec<Value>>,
    }

    impl RecordingExceptionHandler {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }
    }

    impl ExceptionHandler for RecordingExceptionHandler {
        fn handle(&self, record: &Value, _sink: &dyn ConsoleSink) {
            self.records.lock().push(record.clone());
        }
    }

    struct Harness {
        console: Arc<RecordingConsole>,
        exceptions: Arc<RecordingExceptionHandler>,
        mini_app: Option<Arc<RecordingMiniApp>>,
        dispatcher: MessageDispatcher,
    }

    fn harness(mini_app: bool, diagnostic: bool) -> Harness {
        let console = Arc::new(RecordingConsole::new());
        let exceptions = Arc::new(RecordingExceptionHandler::new());
        let app = mini_app.then(|| Arc::new(RecordingMiniApp::new()));
        let collaborators = Collaborators {
            sink: console.clone(),
            run_state: console.clone(),
            exceptions: exceptions.clone(),
            mini_app: app
                .clone()
                .map(|a| a as Arc<dyn crate::collaborators::MiniApp>),
        };
        Harness {
            console,
            exceptions,
            mini_app: app,
            dispatcher: MessageDispatcher::new(collaborators, diagnostic),
        }
    }

    #[test]
    fn system_out_is_forwarded_verbatim() {
        let mut h = harness(false, false);
        h.dispatcher
            .dispatch(r#"{"type":"SYSTEM_OUT","value":"Hello"}"#);
        assert_eq!(h.console.lines(), vec!["Hello".to_string()]);
    }

    #[test]
    fn status_drives_the_tracker() {
        let mut h = harness(false, false);
        h.dispatcher
            .dispatch(r#"{"type":"STATUS","value":"COMPILING"}"#);
        assert_eq!(h.dispatcher.tracker().phase(), RunPhase::Compiling);
        assert_eq!(h.console.lines().len(), 1);
    }

    #[test]
    fn exception_reaches_the_handler_with_full_record() {
        let mut h = harness(false, false);
        h.dispatcher
            .dispatch(r#"{"type":"EXCEPTION","value":{"message":"boom"}}"#);
        let records = h.exceptions.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["type"], "EXCEPTION");
        assert_eq!(records[0]["value"]["message"], "boom");
    }

    #[test]
    fn debug_is_dropped_outside_diagnostic_context() {
        let mut h = harness(false, false);
        h.dispatcher
            .dispatch(r#"{"type":"DEBUG","value":"lambda cold start"}"#);
        assert!(h.console.lines().is_empty());
    }

    #[test]
    fn debug_is_forwarded_in_diagnostic_context() {
        let mut h = harness(false, true);
        h.dispatcher
            .dispatch(r#"{"type":"DEBUG","value":"lambda cold start"}"#);
        assert_eq!(h.console.lines(), vec!["lambda cold start".to_string()]);
    }

    #[test]
    fn signal_reaches_attached_mini_app() {
        let mut h = harness(true, false);
        h.dispatcher
            .dispatch(r#"{"type":"NEIGHBORHOOD","value":{"signal":"PAINT"}}"#);
        let app = h.mini_app.unwrap();
        let signals = app.signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0]["value"]["signal"], "PAINT");
    }

    #[test]
    fn signal_without_mini_app_is_ignored() {
        let mut h = harness(false, false);
        h.dispatcher
            .dispatch(r#"{"type":"THEATER","value":{"signal":"AUDIO_URL"}}"#);
        assert!(h.console.lines().is_empty());
    }

    #[test]
    fn unrecognized_type_produces_no_output_and_no_state_change() {
        let mut h = harness(false, false);
        h.dispatcher.dispatch(r#"{"type":"TELEMETRY","value":"x"}"#);
        assert!(h.console.lines().is_empty());
        assert_eq!(h.dispatcher.tracker().phase(), RunPhase::Preconnect);
    }

    #[test]
    fn malformed_frame_is_dropped_not_fatal() {
        let mut h = harness(false, false);
        h.dispatcher.dispatch("{broken");
        h.dispatcher
            .dispatch(r#"{"type":"SYSTEM_OUT","value":"still alive"}"#);
        assert_eq!(h.console.lines(), vec!["still alive".to_string()]);
    }

    #[test]
    fn open_event_fires_mini_app_compile_hook() {
        let mut h = harness(true, false);
        h.dispatcher.handle_event(SocketEvent::Open);
        assert_eq!(h.mini_app.unwrap().compile_count(), 1);
    }

    #[test]
    fn open_event_without_mini_app_is_fine() {
        let mut h = harness(false, false);
        h.dispatcher.handle_event(SocketEvent::Open);
        assert!(h.console.lines().is_empty());
    }

    #[test]
    fn error_event_writes_one_generic_line() {
        let mut h = harness(false, false);
        h.dispatcher
            .handle_event(SocketEvent::Error("tls handshake".to_string()));
        assert_eq!(h.console.lines(), vec![CONNECTION_ERROR_MESSAGE.to_string()]);
    }

    #[test]
    fn close_event_does_not_touch_run_state() {
        let mut h = harness(false, false);
        h.dispatcher
            .dispatch(r#"{"type":"STATUS","value":"RUNNING"}"#);
        h.dispatcher.handle_event(SocketEvent::Close {
            code: 1006,
            reason: String::new(),
            was_clean: false,
        });
        // No EXITED status arrived, so the phase stays put and no completion
        // text is written.
        assert_eq!(h.dispatcher.tracker().phase(), RunPhase::Running);
        assert!(h.console.running_changes().is_empty());
    }

    #[test]
    fn frame_burst_produces_exact_console_sequence() {
        let mut h = harness(false, false);
        for frame in [
            r#"{"type":"STATUS","value":"COMPILING"}"#,
            r#"{"type":"STATUS","value":"RUNNING"}"#,
            r#"{"type":"SYSTEM_OUT","value":"42"}"#,
            r#"{"type":"STATUS","value":"EXITED"}"#,
        ] {
            h.dispatcher.dispatch(frame);
        }
        assert_eq!(
            h.console.lines(),
            vec![
                "[JAVALAB] Compiling...".to_string(),
                "[JAVALAB] Running...".to_string(),
                String::new(),
                "42".to_string(),
                String::new(),
                "[JAVALAB] Program completed.".to_string(),
                String::new(),
            ]
        );
        assert_eq!(h.console.running_changes(), vec![false]);
    }
}
