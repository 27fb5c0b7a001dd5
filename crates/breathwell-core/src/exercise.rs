//! Built-in exercise catalog.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::session::{BreathingPattern, ExerciseRef, ExerciseType, SessionConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub kind: ExerciseType,
    pub pattern: BreathingPattern,
    /// Default session length in seconds.
    pub default_secs: u32,
    #[serde(default)]
    pub description: String,
}

impl Exercise {
    fn builtin(
        id: &str,
        name: &str,
        kind: ExerciseType,
        pattern: BreathingPattern,
        default_secs: u32,
        description: &str,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            pattern,
            default_secs,
            description: description.into(),
        }
    }

    pub fn reference(&self) -> ExerciseRef {
        ExerciseRef::new(self.id.clone(), self.kind)
    }

    /// Session config for this exercise, optionally overriding its length.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] if the override is zero.
    pub fn session_config(&self, total_secs: Option<u32>) -> Result<SessionConfig, SessionError> {
        let config = SessionConfig::new(
            total_secs.unwrap_or(self.default_secs),
            self.pattern,
            self.reference(),
        );
        config.validate()?;
        Ok(config)
    }
}

/// The exercises shipped with the app, in display order.
pub fn catalog() -> Vec<Exercise> {
    vec![
        Exercise::builtin(
            "box",
            "Box Breathing",
            ExerciseType::Breathing,
            BreathingPattern::new(4, 4, 4, 4),
            240,
            "Equal counts in, hold, out, hold. Steadies attention under stress.",
        ),
        Exercise::builtin(
            "relaxing",
            "4-7-8 Relaxing",
            ExerciseType::Breathing,
            BreathingPattern::new(4, 7, 8, 0),
            180,
            "Long hold and slow exhale to wind down before sleep.",
        ),
        Exercise::builtin(
            "coherent",
            "Coherent Breathing",
            ExerciseType::Breathing,
            BreathingPattern::new(5, 0, 5, 0),
            300,
            "About six breaths a minute with no holds.",
        ),
        Exercise::builtin(
            "calm",
            "Deep Calm",
            ExerciseType::Breathing,
            BreathingPattern::new(4, 2, 6, 0),
            300,
            "Exhale longer than the inhale.",
        ),
        Exercise::builtin(
            "body-scan",
            "Mindful Body Scan",
            ExerciseType::Mindfulness,
            BreathingPattern::new(4, 0, 6, 0),
            600,
            "Slow breathing while moving attention from head to toe.",
        ),
    ]
}

/// Look up an exercise by id.
///
/// # Errors
/// Returns [`SessionError::UnknownExercise`] if no exercise has that id.
pub fn find(id: &str) -> Result<Exercise, SessionError> {
    catalog()
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| SessionError::UnknownExercise(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_patterns_are_valid() {
        for exercise in catalog() {
            assert!(exercise.pattern.validate().is_ok(), "{}", exercise.id);
            assert!(exercise.session_config(None).is_ok(), "{}", exercise.id);
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<String> = catalog().into_iter().map(|e| e.id).collect();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("relaxing").unwrap().pattern, BreathingPattern::new(4, 7, 8, 0));
        assert_eq!(
            find("nope"),
            Err(SessionError::UnknownExercise("nope".into()))
        );
    }

    #[test]
    fn session_config_override() {
        let ex = find("box").unwrap();
        assert_eq!(ex.session_config(Some(30)).unwrap().total_secs, 30);
        assert_eq!(ex.session_config(None).unwrap().total_secs, 240);
        assert!(ex.session_config(Some(0)).is_err());
    }

    #[test]
    fn body_scan_is_mindfulness() {
        assert_eq!(find("body-scan").unwrap().kind, ExerciseType::Mindfulness);
    }
}
