//! Breath phase sequencer.
//!
//! Cycles `inhale -> hold-in -> exhale -> hold-out` using the configured
//! durations, skipping phases whose duration is zero. Like the session clock
//! it owns no timers: the caller feeds elapsed time through [`PhaseSequencer::advance`]
//! from a single heartbeat, and a large delta may cross several phase
//! boundaries at once.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pattern::{BreathingPattern, Phase};
use crate::error::SessionError;

/// A single phase boundary crossed during `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    /// Breath count after this transition.
    pub breath_count: u32,
    /// Set on every re-entry into inhale, i.e. once per completed breath.
    pub cue: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequencerState {
    Idle,
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    pattern: BreathingPattern,
    phase: Phase,
    in_phase: Duration,
    breath_count: u32,
    state: SequencerState,
}

impl PhaseSequencer {
    pub fn new() -> Self {
        Self {
            pattern: BreathingPattern::new(4, 0, 4, 0),
            phase: Phase::Inhale,
            in_phase: Duration::ZERO,
            breath_count: 0,
            state: SequencerState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn breath_count(&self) -> u32 {
        self.breath_count
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    pub fn is_running(&self) -> bool {
        self.state == SequencerState::Running
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SequencerState::Stopped
    }

    /// Time left before the current phase ends.
    pub fn phase_remaining(&self) -> Duration {
        self.pattern
            .duration(self.phase)
            .saturating_sub(self.in_phase)
    }

    /// 0.0 .. 1.0 position within the current breath cycle.
    pub fn cycle_progress(&self) -> f64 {
        let total = u64::from(self.pattern.cycle_secs()) * 1000;
        if total == 0 {
            return 0.0;
        }
        let before: u64 = Phase::ORDER
            .iter()
            .take_while(|p| **p != self.phase)
            .map(|p| u64::from(self.pattern.secs(*p)) * 1000)
            .sum();
        let pos = (before + self.in_phase.as_millis() as u64).min(total);
        pos as f64 / total as f64
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin at inhale. The initial inhale does not count as a breath.
    pub fn start(&mut self, pattern: BreathingPattern) -> Result<(), SessionError> {
        pattern.validate()?;
        self.pattern = pattern;
        self.phase = Phase::Inhale;
        self.in_phase = Duration::ZERO;
        self.breath_count = 0;
        self.state = SequencerState::Running;
        Ok(())
    }

    pub fn pause(&mut self) -> bool {
        if self.state == SequencerState::Running {
            self.state = SequencerState::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.state == SequencerState::Paused {
            self.state = SequencerState::Running;
            true
        } else {
            false
        }
    }

    /// Halt all further phase progression until the next `start`.
    pub fn stop(&mut self) {
        self.state = SequencerState::Stopped;
    }

    /// Consume `dt` of phase time and report every boundary crossed.
    ///
    /// A phase ends when its elapsed time reaches its duration exactly.
    pub fn advance(&mut self, dt: Duration) -> Vec<PhaseTransition> {
        let mut transitions = Vec::new();
        if self.state != SequencerState::Running {
            return transitions;
        }

        let mut dt = dt;
        loop {
            let left = self.phase_remaining();
            if dt < left {
                self.in_phase += dt;
                break;
            }
            dt -= left;

            let from = self.phase;
            let to = self.pattern.next_active(from);
            self.phase = to;
            self.in_phase = Duration::ZERO;

            let cue = to == Phase::Inhale;
            if cue {
                self.breath_count = self.breath_count.saturating_add(1);
            }
            tracing::trace!(%from, %to, breath_count = self.breath_count, "phase transition");
            transitions.push(PhaseTransition {
                from,
                to,
                breath_count: self.breath_count,
                cue,
            });

            if dt.is_zero() {
                break;
            }
        }
        transitions
    }
}

impl Default for PhaseSequencer {
    fn default() -> Self {
        Self::new()
    }
}
