//! Collaborator interfaces the session drives.
//!
//! Everything externally observable — console text, the running/idle flag,
//! mini-app lifecycle hooks — happens through these traits. They are
//! injected at session construction so the core never reaches for ambient
//! state and stays unit-testable with recording fakes.

use std::sync::Arc;

use javalab_protocol::STATUS_MESSAGE_PREFIX;
use serde_json::Value;

/// Destination for every line of user-visible text: program output, status
/// lines, formatted exceptions, generic error messages.
pub trait ConsoleSink: Send + Sync {
    /// Append one line to the console.
    fn write_line(&self, line: &str);
}

/// The caller-owned store of whether a program is currently executing.
pub trait RunState: Send + Sync {
    /// Flip the running/idle flag.
    fn set_running(&self, running: bool);
    /// Append a blank separator line to the console log.
    fn append_blank_line(&self);
}

/// An optional embedded mini-app (Neighborhood, Theater) with its own
/// lifecycle hooks and signal protocol.
///
/// Every hook has a no-op default body, so a mini-app implements only the
/// hooks it cares about; the session never assumes all three exist.
pub trait MiniApp: Send + Sync {
    /// The connection opened and compilation is about to start.
    fn on_compile(&self) {}

    /// The remote program exited. A mini-app that implements this owns its
    /// own "done" presentation, including resetting the running flag.
    fn on_close(&self) {}

    /// A signal frame addressed to this mini-app, with the full record.
    fn handle_signal(&self, record: &Value) {
        let _ = record;
    }
}

/// Formats exception records and writes them to the output sink.
pub trait ExceptionHandler: Send + Sync {
    /// Handle one full `EXCEPTION` record.
    fn handle(&self, record: &Value, sink: &dyn ConsoleSink);
}

/// Minimal exception handler: one prefixed line with the exception message,
/// full record at debug level. The web platform substitutes its own
/// localized formatter.
pub struct LoggingExceptionHandler;

impl ExceptionHandler for LoggingExceptionHandler {
    fn handle(&self, record: &Value, sink: &dyn ConsoleSink) {
        tracing::debug!(?record, "exception record");
        let message = record
            .get("value")
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .or_else(|| record.get("value").and_then(Value::as_str))
            .unwrap_or("The program raised an exception.");
        sink.write_line(&format!("{STATUS_MESSAGE_PREFIX} {message}"));
    }
}

/// The full set of injected collaborators for one session.
#[derive(Clone)]
pub struct Collaborators {
    /// Console output sink.
    pub sink: Arc<dyn ConsoleSink>,
    /// Running/idle flag owner.
    pub run_state: Arc<dyn RunState>,
    /// Exception formatter.
    pub exceptions: Arc<dyn ExceptionHandler>,
    /// Embedded mini-app, if any.
    pub mini_app: Option<Arc<dyn MiniApp>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingConsole;

    struct BareMiniApp;
    impl MiniApp for BareMiniApp {}

    #[test]
    fn mini_app_hooks_default_to_noops() {
        // A mini-app with no hooks implemented is valid.
        let app = BareMiniApp;
        app.on_compile();
        app.on_close();
        app.handle_signal(&serde_json::json!({"type": "THEATER"}));
    }

    #[test]
    fn logging_exception_handler_uses_nested_message() {
        let console = RecordingConsole::new();
        let record = serde_json::json!({
            "type": "EXCEPTION",
            "value": {"message": "NullPointerException at line 3"}
        });
        LoggingExceptionHandler.handle(&record, &console);
        assert_eq!(
            console.lines(),
            vec![format!(
                "{STATUS_MESSAGE_PREFIX} NullPointerException at line 3"
            )]
        );
    }

    #[test]
    fn logging_exception_handler_accepts_string_value() {
        let console = RecordingConsole::new();
        let record = serde_json::json!({"type": "EXCEPTION", "value": "StackOverflowError"});
        LoggingExceptionHandler.handle(&record, &console);
        assert_eq!(
            console.lines(),
            vec![format!("{STATUS_MESSAGE_PREFIX} StackOverflowError")]
        );
    }

    #[test]
    fn logging_exception_handler_falls_back_on_opaque_records() {
        let console = RecordingConsole::new();
        let record = serde_json::json!({"type": "EXCEPTION", "value": {"code": 7}});
        LoggingExceptionHandler.handle(&record, &console);
        assert_eq!(
            console.lines(),
            vec![format!(
                "{STATUS_MESSAGE_PREFIX} The program raised an exception."
            )]
        );
    }
}
