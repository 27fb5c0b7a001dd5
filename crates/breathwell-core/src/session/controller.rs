//! Breathing session controller.
//!
//! A heartbeat-driven state machine. It has no internal threads or timers:
//! the caller invokes [`BreathingSession::tick`] once per second (or
//! [`BreathingSession::advance`] with a measured delta) and receives the
//! events produced by that step.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Playing <-> Paused -> Completed
//!            \__________________/
//!                  reset
//! ```
//!
//! `Completed` is terminal for a session instance: completion runs once,
//! records one log item, and every later step is a no-op until `start` or
//! `reset` begins a new instance.
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = SessionContext::new(MemoryStore::new(), "local");
//! let mut session = BreathingSession::new(ctx);
//! session.start(config)?;
//! // Once per second:
//! for event in session.tick() { /* render cue, toast, ... */ }
//! ```

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::clock::{ClockTick, SessionClock};
use super::pattern::{Phase, SessionConfig};
use super::recorder::{CompletionReason, SessionLogItem, SessionLogRecorder};
use super::sequencer::PhaseSequencer;
use crate::error::{SessionError, StorageError};
use crate::events::Event;
use crate::storage::KvStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Playing,
    Paused,
    /// Terminal for this session instance.
    Completed,
}

/// Read-only view of the observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub time_remaining: u32,
    pub current_phase: Phase,
    pub is_playing: bool,
    pub is_completed: bool,
    pub breath_count: u32,
}

/// Per-session collaborators, handed to the controller at construction.
///
/// Holds the log recorder (and through it the storage handle) for one user.
/// Dropped together with the controller.
pub struct SessionContext<S> {
    user_id: String,
    recorder: SessionLogRecorder<S>,
}

impl<S: KvStore> SessionContext<S> {
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let recorder = SessionLogRecorder::new(store, &user_id);
        Self { user_id, recorder }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn recorder(&self) -> &SessionLogRecorder<S> {
        &self.recorder
    }

    pub fn history(&self) -> Result<Vec<SessionLogItem>, StorageError> {
        self.recorder.history()
    }

    pub fn into_store(self) -> S {
        self.recorder.into_store()
    }
}

pub struct BreathingSession<S> {
    ctx: SessionContext<S>,
    config: Option<SessionConfig>,
    clock: SessionClock,
    sequencer: PhaseSequencer,
    status: SessionStatus,
}

impl<S: KvStore> BreathingSession<S> {
    pub fn new(ctx: SessionContext<S>) -> Self {
        Self {
            ctx,
            config: None,
            clock: SessionClock::new(),
            sequencer: PhaseSequencer::new(),
            status: SessionStatus::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn time_remaining(&self) -> u32 {
        self.clock.time_remaining()
    }

    pub fn current_phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn breath_count(&self) -> u32 {
        self.sequencer.breath_count()
    }

    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Active time consumed by the current session instance.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn context(&self) -> &SessionContext<S> {
        &self.ctx
    }

    pub fn into_context(self) -> SessionContext<S> {
        self.ctx
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            time_remaining: self.time_remaining(),
            current_phase: self.current_phase(),
            is_playing: self.is_playing(),
            is_completed: self.is_completed(),
            breath_count: self.breath_count(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let phase_remaining = self.sequencer.phase_remaining();
        Event::StateSnapshot {
            status: self.status,
            time_remaining: self.time_remaining(),
            total_secs: self.clock.total_secs(),
            phase: self.current_phase(),
            phase_remaining_secs: phase_remaining.as_secs_f64().ceil() as u32,
            breath_count: self.breath_count(),
            cycle_progress: self.sequencer.cycle_progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate `config` and begin a new session instance.
    ///
    /// # Errors
    /// [`SessionError::AlreadyActive`] while a session is playing or paused;
    /// [`SessionError::InvalidConfig`] for a zero total or a zero
    /// inhale/exhale.
    pub fn start(&mut self, config: SessionConfig) -> Result<Event, SessionError> {
        if matches!(self.status, SessionStatus::Playing | SessionStatus::Paused) {
            return Err(SessionError::AlreadyActive);
        }
        config.validate()?;

        self.sequencer.start(config.pattern)?;
        self.clock.start(config.total_secs);
        self.status = SessionStatus::Playing;

        tracing::info!(
            user = %self.ctx.user_id,
            exercise = %config.exercise.id,
            total_secs = config.total_secs,
            pattern = %config.pattern,
            "breathing session started"
        );

        let event = Event::SessionStarted {
            exercise_id: config.exercise.id.clone(),
            exercise_type: config.exercise.kind,
            total_secs: config.total_secs,
            pattern: config.pattern,
            at: Utc::now(),
        };
        self.config = Some(config);
        Ok(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        self.clock.pause();
        self.sequencer.pause();
        self.status = SessionStatus::Paused;
        tracing::debug!(time_remaining = self.time_remaining(), "session paused");
        Some(Event::SessionPaused {
            time_remaining: self.time_remaining(),
            phase: self.current_phase(),
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.status != SessionStatus::Paused {
            return None;
        }
        self.clock.resume();
        self.sequencer.resume();
        self.status = SessionStatus::Playing;
        tracing::debug!(time_remaining = self.time_remaining(), "session resumed");
        Some(Event::SessionResumed {
            time_remaining: self.time_remaining(),
            phase: self.current_phase(),
            at: Utc::now(),
        })
    }

    /// Return to the initial state for `config`, whatever the prior state.
    ///
    /// Begins a new session instance: the remaining time is the full total,
    /// the breath count is zero and completion is re-armed. A session that
    /// was playing keeps playing; otherwise it waits paused for `resume`.
    pub fn reset(&mut self, config: SessionConfig) -> Result<Event, SessionError> {
        config.validate()?;
        let keep_playing = self.status == SessionStatus::Playing;

        self.sequencer.start(config.pattern)?;
        self.clock.reset(config.total_secs);
        if keep_playing {
            self.clock.resume();
            self.status = SessionStatus::Playing;
        } else {
            self.sequencer.pause();
            self.status = SessionStatus::Paused;
        }

        tracing::debug!(total_secs = config.total_secs, keep_playing, "session reset");
        let event = Event::SessionReset {
            total_secs: config.total_secs,
            playing: keep_playing,
            at: Utc::now(),
        };
        self.config = Some(config);
        Ok(event)
    }

    /// One heartbeat: advance by exactly one second.
    pub fn tick(&mut self) -> Vec<Event> {
        self.advance(Duration::from_secs(1))
    }

    /// Advance the session by `dt` of wall-clock time.
    ///
    /// The clock goes first. The sequencer only receives the part of `dt`
    /// the clock actually consumed, so it never runs past the session end.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        if self.status != SessionStatus::Playing {
            return events;
        }

        let before = self.clock.elapsed();
        let tick = self.clock.advance(dt);
        let consumed = self.clock.elapsed().saturating_sub(before);

        let time_remaining = self.clock.time_remaining();
        for t in self.sequencer.advance(consumed) {
            events.push(Event::PhaseChanged {
                from: t.from,
                to: t.to,
                breath_count: t.breath_count,
                time_remaining,
                at: Utc::now(),
            });
            if t.cue {
                events.push(Event::BreathCue {
                    breath_count: t.breath_count,
                    at: Utc::now(),
                });
            }
        }

        if tick == ClockTick::Expired {
            events.extend(self.complete(CompletionReason::Expired));
        }
        events
    }

    /// End the session early and record the active time so far.
    ///
    /// No-op when nothing is running or the session already completed.
    pub fn stop(&mut self) -> Vec<Event> {
        match self.status {
            SessionStatus::Playing | SessionStatus::Paused => {
                self.complete(CompletionReason::Stopped)
            }
            SessionStatus::Idle | SessionStatus::Completed => Vec::new(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Terminal transition. Runs at most once per session instance.
    fn complete(&mut self, reason: CompletionReason) -> Vec<Event> {
        if self.status == SessionStatus::Completed {
            tracing::debug!(?reason, "session already completed; ignoring");
            return Vec::new();
        }
        let Some(config) = self.config.as_ref() else {
            return Vec::new();
        };

        self.status = SessionStatus::Completed;
        self.clock.stop();
        self.sequencer.stop();

        let elapsed_secs = self.clock.elapsed().as_secs() as u32;
        let breath_count = self.sequencer.breath_count();
        let mut events = Vec::new();

        let log_item = match self.ctx.recorder.record(
            &config.exercise.id,
            config.exercise.kind,
            elapsed_secs,
            reason,
        ) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist session log item");
                events.push(Event::LogWriteFailed {
                    message: e.to_string(),
                    at: Utc::now(),
                });
                None
            }
        };

        tracing::info!(
            exercise = %config.exercise.id,
            ?reason,
            elapsed_secs,
            breath_count,
            "breathing session completed"
        );

        events.insert(
            0,
            Event::SessionCompleted {
                reason,
                elapsed_secs,
                breath_count,
                log_item,
                at: Utc::now(),
            },
        );
        events
    }
}
