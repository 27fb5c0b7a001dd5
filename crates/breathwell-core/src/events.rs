use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{
    BreathingPattern, CompletionReason, ExerciseType, Phase, SessionLogItem, SessionStatus,
};

/// Every observable change in a breathing session produces an Event.
/// The UI renders cues and notifications from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        exercise_id: String,
        exercise_type: ExerciseType,
        total_secs: u32,
        pattern: BreathingPattern,
        at: DateTime<Utc>,
    },
    SessionPaused {
        time_remaining: u32,
        phase: Phase,
        at: DateTime<Utc>,
    },
    SessionResumed {
        time_remaining: u32,
        phase: Phase,
        at: DateTime<Utc>,
    },
    SessionReset {
        total_secs: u32,
        playing: bool,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        breath_count: u32,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    /// A full breath was completed; play the audible/visual cue.
    BreathCue {
        breath_count: u32,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        reason: CompletionReason,
        elapsed_secs: u32,
        breath_count: u32,
        /// `None` when the log write failed; see `LogWriteFailed`.
        log_item: Option<SessionLogItem>,
        at: DateTime<Utc>,
    },
    /// The session completed but its log item could not be persisted.
    LogWriteFailed {
        message: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: SessionStatus,
        time_remaining: u32,
        total_secs: u32,
        phase: Phase,
        phase_remaining_secs: u32,
        breath_count: u32,
        cycle_progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short name used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SessionPaused { .. } => "session_paused",
            Event::SessionResumed { .. } => "session_resumed",
            Event::SessionReset { .. } => "session_reset",
            Event::PhaseChanged { .. } => "phase_changed",
            Event::BreathCue { .. } => "breath_cue",
            Event::SessionCompleted { .. } => "session_completed",
            Event::LogWriteFailed { .. } => "log_write_failed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
