//! Run-status keywords carried by `STATUS` messages.

use serde::{Deserialize, Serialize};

/// The run-status keywords this client reacts to.
///
/// `STATUS` values outside this set cause no transition and no output —
/// the backend may introduce keywords unknown to older clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// Sources are being compiled.
    #[serde(rename = "COMPILING")]
    Compiling,
    /// Compilation finished without errors.
    #[serde(rename = "COMPILATION_SUCCESSFUL")]
    CompilationSuccessful,
    /// The program is executing.
    #[serde(rename = "RUNNING")]
    Running,
    /// Output artifacts are being assembled (batch mini-apps).
    #[serde(rename = "GENERATING_RESULTS")]
    GeneratingResults,
    /// The program finished. Terminal.
    #[serde(rename = "EXITED")]
    Exited,
}

impl RunStatus {
    /// Look up a `STATUS` keyword, `None` for keywords unknown to this
    /// client.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "COMPILING" => Some(Self::Compiling),
            "COMPILATION_SUCCESSFUL" => Some(Self::CompilationSuccessful),
            "RUNNING" => Some(Self::Running),
            "GENERATING_RESULTS" => Some(Self::GeneratingResults),
            "EXITED" => Some(Self::Exited),
            _ => None,
        }
    }

    /// The exact wire keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Compiling => "COMPILING",
            Self::CompilationSuccessful => "COMPILATION_SUCCESSFUL",
            Self::Running => "RUNNING",
            Self::GeneratingResults => "GENERATING_RESULTS",
            Self::Exited => "EXITED",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
