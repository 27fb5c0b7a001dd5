use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// One stage of a breath cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl Phase {
    /// Cycle order. Zero-length phases are skipped by the sequencer.
    pub const ORDER: [Phase; 4] = [Phase::Inhale, Phase::HoldIn, Phase::Exhale, Phase::HoldOut];

    pub fn next(self) -> Phase {
        match self {
            Phase::Inhale => Phase::HoldIn,
            Phase::HoldIn => Phase::Exhale,
            Phase::Exhale => Phase::HoldOut,
            Phase::HoldOut => Phase::Inhale,
        }
    }

    /// Short instruction shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in",
            Phase::HoldIn => "Hold",
            Phase::Exhale => "Breathe out",
            Phase::HoldOut => "Rest",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Inhale => "inhale",
            Phase::HoldIn => "hold-in",
            Phase::Exhale => "exhale",
            Phase::HoldOut => "hold-out",
        };
        f.write_str(s)
    }
}

/// Per-phase durations in seconds.
///
/// Holds may be omitted in serialized form and default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingPattern {
    pub inhale: u32,
    #[serde(default)]
    pub hold_in: u32,
    pub exhale: u32,
    #[serde(default)]
    pub hold_out: u32,
}

impl BreathingPattern {
    pub const fn new(inhale: u32, hold_in: u32, exhale: u32, hold_out: u32) -> Self {
        Self {
            inhale,
            hold_in,
            exhale,
            hold_out,
        }
    }

    pub fn secs(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::HoldIn => self.hold_in,
            Phase::Exhale => self.exhale,
            Phase::HoldOut => self.hold_out,
        }
    }

    pub fn duration(&self, phase: Phase) -> Duration {
        Duration::from_secs(u64::from(self.secs(phase)))
    }

    pub fn cycle_secs(&self) -> u32 {
        self.inhale
            .saturating_add(self.hold_in)
            .saturating_add(self.exhale)
            .saturating_add(self.hold_out)
    }

    /// Phases that are actually entered, in cycle order.
    pub fn active_phases(&self) -> Vec<Phase> {
        Phase::ORDER
            .into_iter()
            .filter(|p| self.secs(*p) > 0)
            .collect()
    }

    /// Next phase after `from` with a nonzero duration.
    ///
    /// Inhale and exhale are always nonzero once validated, so this terminates
    /// within three steps.
    pub fn next_active(&self, from: Phase) -> Phase {
        let mut phase = from.next();
        while self.secs(phase) == 0 && phase != from {
            phase = phase.next();
        }
        phase
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.inhale == 0 {
            return Err(SessionError::invalid("inhale", "must be greater than zero"));
        }
        if self.exhale == 0 {
            return Err(SessionError::invalid("exhale", "must be greater than zero"));
        }
        Ok(())
    }
}

impl fmt::Display for BreathingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.inhale, self.hold_in, self.exhale, self.hold_out
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Breathing,
    Mindfulness,
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseType::Breathing => f.write_str("breathing"),
            ExerciseType::Mindfulness => f.write_str("mindfulness"),
        }
    }
}

/// Reference to the exercise a session runs, as stored on its log item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRef {
    pub id: String,
    pub kind: ExerciseType,
}

impl ExerciseRef {
    pub fn new(id: impl Into<String>, kind: ExerciseType) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Everything needed to start a session. Immutable once started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub total_secs: u32,
    pub pattern: BreathingPattern,
    pub exercise: ExerciseRef,
}

impl SessionConfig {
    pub fn new(total_secs: u32, pattern: BreathingPattern, exercise: ExerciseRef) -> Self {
        Self {
            total_secs,
            pattern,
            exercise,
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.total_secs == 0 {
            return Err(SessionError::invalid(
                "total_secs",
                "must be greater than zero",
            ));
        }
        if self.exercise.id.trim().is_empty() {
            return Err(SessionError::invalid("exercise.id", "must not be empty"));
        }
        self.pattern.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise() -> ExerciseRef {
        ExerciseRef::new("box", ExerciseType::Breathing)
    }

    #[test]
    fn phase_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&Phase::HoldIn).unwrap(), "\"hold-in\"");
        assert_eq!(Phase::HoldOut.to_string(), "hold-out");
    }

    #[test]
    fn omitted_holds_default_to_zero() {
        let p: BreathingPattern = serde_json::from_str(r#"{"inhale":4,"exhale":8}"#).unwrap();
        assert_eq!(p, BreathingPattern::new(4, 0, 8, 0));
        assert_eq!(p.active_phases(), vec![Phase::Inhale, Phase::Exhale]);
    }

    #[test]
    fn next_active_skips_zero_holds() {
        let p = BreathingPattern::new(4, 0, 8, 0);
        assert_eq!(p.next_active(Phase::Inhale), Phase::Exhale);
        assert_eq!(p.next_active(Phase::Exhale), Phase::Inhale);

        let only_hold_out = BreathingPattern::new(4, 0, 4, 2);
        assert_eq!(only_hold_out.next_active(Phase::Inhale), Phase::Exhale);
        assert_eq!(only_hold_out.next_active(Phase::Exhale), Phase::HoldOut);
        assert_eq!(only_hold_out.next_active(Phase::HoldOut), Phase::Inhale);
    }

    #[test]
    fn cycle_secs_sums_all_phases() {
        assert_eq!(BreathingPattern::new(4, 7, 8, 0).cycle_secs(), 19);
    }

    #[test]
    fn validate_rejects_zero_inhale_or_exhale() {
        assert!(BreathingPattern::new(0, 4, 4, 4).validate().is_err());
        assert!(BreathingPattern::new(4, 4, 0, 4).validate().is_err());
        assert!(BreathingPattern::new(4, 0, 4, 0).validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_total() {
        let cfg = SessionConfig::new(0, BreathingPattern::new(4, 4, 4, 4), exercise());
        assert_eq!(
            cfg.validate(),
            Err(SessionError::invalid("total_secs", "must be greater than zero"))
        );
    }

    #[test]
    fn config_rejects_blank_exercise_id() {
        let cfg = SessionConfig::new(
            60,
            BreathingPattern::new(4, 4, 4, 4),
            ExerciseRef::new("  ", ExerciseType::Breathing),
        );
        assert!(cfg.validate().is_err());
    }
}
