//! The run-status state machine.
//!
//! Driven one-to-one by `STATUS` message values. The tracker owns the
//! user-facing phase text and the exit handling; it never reacts to
//! transport close or error, because a transport hiccup must not mark a
//! running program as finished (the backend signals a real finish with an
//! `EXITED` status).

use javalab_protocol::{RunStatus, STATUS_MESSAGE_PREFIX};

use crate::collaborators::{ConsoleSink, MiniApp, RunState};

const COMPILING_TEXT: &str = "Compiling...";
const COMPILATION_SUCCESSFUL_TEXT: &str = "Compilation successful.";
const RUNNING_TEXT: &str = "Running...";
const GENERATING_RESULTS_TEXT: &str = "Generating results...";
const PROGRAM_COMPLETED_TEXT: &str = "Program completed.";

/// The lifecycle phases of one remote run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    /// No status message has arrived yet.
    #[default]
    Preconnect,
    /// Sources are compiling.
    Compiling,
    /// Compilation finished without errors.
    CompilationSuccessful,
    /// The program is executing.
    Running,
    /// The backend is assembling output artifacts.
    GeneratingResults,
    /// The program finished. Terminal: no further status is processed.
    Exited,
}

impl From<RunStatus> for RunPhase {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Compiling => Self::Compiling,
            RunStatus::CompilationSuccessful => Self::CompilationSuccessful,
            RunStatus::Running => Self::Running,
            RunStatus::GeneratingResults => Self::GeneratingResults,
            RunStatus::Exited => Self::Exited,
        }
    }
}

/// Tracks the remote program's lifecycle through `STATUS` messages.
#[derive(Debug, Default)]
pub struct RunStatusTracker {
    phase: RunPhase,
}

impl RunStatusTracker {
    /// A tracker in the pre-connection phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Whether exit handling has run.
    pub fn is_exited(&self) -> bool {
        self.phase == RunPhase::Exited
    }

    /// Apply one `STATUS` value.
    ///
    /// Unknown keywords cause no transition and no output. `EXITED` is
    /// terminal and idempotent: once reached, every further status message
    /// is ignored, so exit handling can never run twice.
    pub fn handle_status(
        &mut self,
        keyword: &str,
        sink: &dyn ConsoleSink,
        run_state: &dyn RunState,
        mini_app: Option<&dyn MiniApp>,
    ) {
        let Some(status) = RunStatus::from_keyword(keyword) else {
            tracing::debug!(keyword, "ignoring unrecognized status keyword");
            return;
        };
        if self.phase == RunPhase::Exited {
            tracing::debug!(keyword, "ignoring status after exit");
            return;
        }

        self.phase = RunPhase::from(status);
        match status {
            RunStatus::Compiling => sink.write_line(&status_line(COMPILING_TEXT)),
            RunStatus::CompilationSuccessful => {
                sink.write_line(&status_line(COMPILATION_SUCCESSFUL_TEXT));
            }
            // Running and result generation precede a burst of program
            // output; the blank line separates it visually.
            RunStatus::Running => {
                sink.write_line(&status_line(RUNNING_TEXT));
                run_state.append_blank_line();
            }
            RunStatus::GeneratingResults => {
                sink.write_line(&status_line(GENERATING_RESULTS_TEXT));
                run_state.append_blank_line();
            }
            RunStatus::Exited => self.handle_exit(sink, run_state, mini_app),
        }
    }

    /// Exit handling. With a mini-app attached, the mini-app owns the "done"
    /// presentation — including resetting the running flag, which may not
    /// align with actual program execution — so the tracker writes nothing
    /// itself.
    fn handle_exit(
        &self,
        sink: &dyn ConsoleSink,
        run_state: &dyn RunState,
        mini_app: Option<&dyn MiniApp>,
    ) {
        if let Some(app) = mini_app {
            app.on_close();
        } else {
            run_state.append_blank_line();
            sink.write_line(&status_line(PROGRAM_COMPLETED_TEXT));
            run_state.append_blank_line();
            run_state.set_running(false);
        }
    }
}

fn status_line(text: &str) -> String {
    format!("{STATUS_MESSAGE_PREFIX} {text}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
