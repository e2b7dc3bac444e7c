//! Recording fakes for collaborator traits, shared across unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::collaborators::{ConsoleSink, MiniApp, RunState};

/// Records every console line and running-flag change, interleaving blank
/// separator lines into the line log the way the real console renders them.
#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
    running_changes: Mutex<Vec<bool>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn running_changes(&self) -> Vec<bool> {
        self.running_changes.lock().clone()
    }
}

impl ConsoleSink for RecordingConsole {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

impl RunState for RecordingConsole {
    fn set_running(&self, running: bool) {
        self.running_changes.lock().push(running);
    }

    fn append_blank_line(&self) {
        self.lines.lock().push(String::new());
    }
}

/// Counts hook invocations and records forwarded signal records.
#[derive(Default)]
pub struct RecordingMiniApp {
    compiles: AtomicUsize,
    closes: AtomicUsize,
    signals: Mutex<Vec<Value>>,
}

impl RecordingMiniApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn signals(&self) -> Vec<Value> {
        self.signals.lock().clone()
    }
}

impl MiniApp for RecordingMiniApp {
    fn on_compile(&self) {
        let _ = self.compiles.fetch_add(1, Ordering::SeqCst);
    }

    fn on_close(&self) {
        let _ = self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn handle_signal(&self, record: &Value) {
        self.signals.lock().push(record.clone());
    }
}
