use serde::Serialize;

/// One linear pass through an interview as a single tagged state. The
/// UI-visible booleans (busy, recording) are derived from the phase, never
/// stored beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    CheckingDevices,
    Armed,
    Starting,
    AskingQuestion { index: usize },
    Recording { index: usize },
    Submitting { index: usize },
    Finished,
    Faulted { message: String },
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

impl Phase {
    // A stable string label for UI display.
    // This is intentionally not derived from `Debug`.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::CheckingDevices => "checking_devices",
            Phase::Armed => "armed",
            Phase::Starting => "starting",
            Phase::AskingQuestion { .. } => "asking_question",
            Phase::Recording { .. } => "recording",
            Phase::Submitting { .. } => "submitting",
            Phase::Finished => "finished",
            Phase::Faulted { .. } => "faulted",
        }
    }

    /// True exactly while a network round trip blocks further commands.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Starting | Phase::Submitting { .. })
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Phase::Recording { .. })
    }

    pub fn question_index(&self) -> Option<usize> {
        match self {
            Phase::AskingQuestion { index }
            | Phase::Recording { index }
            | Phase::Submitting { index } => Some(*index),
            _ => None,
        }
    }
}

/// Read surface for the embedding shell: everything a front-end needs to
/// render the session, serialized in one payload.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub phase_label: String,
    pub question_index: Option<usize>,
    pub question_text: Option<String>,
    pub busy: bool,
    pub recording: bool,
    pub last_warning: Option<String>,
    pub last_error: Option<String>,
}
