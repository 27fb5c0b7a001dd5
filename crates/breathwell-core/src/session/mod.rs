//! Breathing session engine.
//!
//! - [`PhaseSequencer`]: cycles breath phases, skipping zero-length holds
//! - [`SessionClock`]: authoritative countdown for the session lifetime
//! - [`SessionLogRecorder`]: append-only log of finished sessions
//! - [`BreathingSession`]: the controller tying the three together
//! - [`SessionRunner`]: tokio heartbeat that drives a controller in real time

mod clock;
mod controller;
mod pattern;
pub mod recorder;
mod runner;
mod sequencer;

pub use clock::{ClockTick, SessionClock};
pub use controller::{BreathingSession, SessionContext, SessionState, SessionStatus};
pub use pattern::{BreathingPattern, ExerciseRef, ExerciseType, Phase, SessionConfig};
pub use recorder::{duration_minutes, log_key, CompletionReason, SessionLogItem, SessionLogRecorder};
pub use runner::SessionRunner;
pub use sequencer::{PhaseSequencer, PhaseTransition};
