//! Session countdown.
//!
//! The clock is the only authority on when a session ends. Active time is
//! tracked at millisecond resolution so that pausing mid-second loses
//! nothing; the visible `time_remaining` drops by one per whole second.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Still counting; whole seconds left.
    Running { remaining: u32 },
    /// Reached zero on this advance. Reported once.
    Expired,
    /// Not running; nothing changed.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Idle,
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    total: Duration,
    elapsed: Duration,
    state: ClockState,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            total: Duration::ZERO,
            elapsed: Duration::ZERO,
            state: ClockState::Idle,
        }
    }

    pub fn total_secs(&self) -> u32 {
        self.total.as_secs() as u32
    }

    /// Active (unpaused) time consumed so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn time_remaining(&self) -> u32 {
        self.total_secs()
            .saturating_sub(self.elapsed.as_secs() as u32)
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_expired(&self) -> bool {
        !self.total.is_zero() && self.elapsed >= self.total
    }

    pub fn start(&mut self, total_secs: u32) {
        self.total = Duration::from_secs(u64::from(total_secs));
        self.elapsed = Duration::ZERO;
        self.state = ClockState::Running;
    }

    /// Back to `total_secs` remaining, paused until `resume`.
    pub fn reset(&mut self, total_secs: u32) {
        self.start(total_secs);
        self.state = ClockState::Paused;
    }

    pub fn pause(&mut self) -> bool {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.state == ClockState::Paused && !self.is_expired() {
            self.state = ClockState::Running;
            true
        } else {
            false
        }
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    pub fn advance(&mut self, dt: Duration) -> ClockTick {
        if self.state != ClockState::Running {
            return ClockTick::Idle;
        }
        self.elapsed = (self.elapsed + dt).min(self.total);
        if self.is_expired() {
            self.state = ClockState::Stopped;
            ClockTick::Expired
        } else {
            ClockTick::Running {
                remaining: self.time_remaining(),
            }
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
