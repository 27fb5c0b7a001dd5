//! Append-only session log.
//!
//! Each user has one key in the backing [`KvStore`] holding a JSON array of
//! [`SessionLogItem`]s in completion order. The recorder only appends and
//! reads; guarding against a second record for the same session is the
//! controller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pattern::ExerciseType;
use crate::error::StorageError;
use crate::storage::KvStore;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionReason {
    /// The session clock reached zero.
    #[default]
    Expired,
    /// The user ended the session early.
    Stopped,
}

/// One finished session. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLogItem {
    pub id: String,
    pub date: DateTime<Utc>,
    pub exercise_id: String,
    pub exercise_type: ExerciseType,
    pub duration_minutes: u32,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub reason: CompletionReason,
}

/// Whole minutes in `secs`, rounded down.
///
/// Every logged minute value goes through here, so a 59 s session always
/// logs 0 minutes and a 119 s session always logs 1.
pub fn duration_minutes(secs: u32) -> u32 {
    secs / 60
}

/// Storage key holding a user's session log.
pub fn log_key(user_id: &str) -> String {
    format!("session-log:{user_id}")
}

pub struct SessionLogRecorder<S> {
    store: S,
    key: String,
}

impl<S: KvStore> SessionLogRecorder<S> {
    pub fn new(store: S, user_id: &str) -> Self {
        Self {
            store,
            key: log_key(user_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// All recorded items, oldest first.
    ///
    /// # Errors
    /// Returns [`StorageError::Corrupt`] if the stored value is not a valid
    /// log array.
    pub fn history(&self) -> Result<Vec<SessionLogItem>, StorageError> {
        match self.store.get(&self.key)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key: self.key.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Build a new item stamped now and append it to the log.
    ///
    /// # Errors
    /// Fails if the existing log cannot be read or the write is rejected.
    /// A corrupt log is left untouched rather than overwritten.
    pub fn record(
        &mut self,
        exercise_id: &str,
        exercise_type: ExerciseType,
        elapsed_secs: u32,
        reason: CompletionReason,
    ) -> Result<SessionLogItem, StorageError> {
        let mut items = self.history()?;
        let item = SessionLogItem {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            exercise_id: exercise_id.to_string(),
            exercise_type,
            duration_minutes: duration_minutes(elapsed_secs),
            duration_seconds: elapsed_secs,
            reason,
        };
        items.push(item.clone());

        let json = serde_json::to_string(&items).map_err(|e| StorageError::WriteFailed {
            key: self.key.clone(),
            message: e.to_string(),
        })?;
        self.store.set(&self.key, &json)?;

        tracing::debug!(
            key = %self.key,
            id = %item.id,
            total = items.len(),
            "session log item appended"
        );
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn rounding_is_floor() {
        assert_eq!(duration_minutes(0), 0);
        assert_eq!(duration_minutes(10), 0);
        assert_eq!(duration_minutes(59), 0);
        assert_eq!(duration_minutes(60), 1);
        assert_eq!(duration_minutes(119), 1);
        assert_eq!(duration_minutes(600), 10);
    }

    #[test]
    fn record_appends_in_order() {
        let mut rec = SessionLogRecorder::new(MemoryStore::new(), "alice");
        let a = rec
            .record("box", ExerciseType::Breathing, 240, CompletionReason::Expired)
            .unwrap();
        let b = rec
            .record("body-scan", ExerciseType::Mindfulness, 95, CompletionReason::Stopped)
            .unwrap();
        assert_ne!(a.id, b.id);

        let history = rec.history().unwrap();
        assert_eq!(history, vec![a, b]);
        assert_eq!(history[0].duration_minutes, 4);
        assert_eq!(history[1].duration_minutes, 1);
        assert_eq!(history[1].duration_seconds, 95);
    }

    #[test]
    fn users_have_separate_logs() {
        let mut rec = SessionLogRecorder::new(MemoryStore::new(), "alice");
        rec.record("box", ExerciseType::Breathing, 60, CompletionReason::Expired)
            .unwrap();
        let store = rec.into_store();
        let other = SessionLogRecorder::new(store, "bob");
        assert!(other.history().unwrap().is_empty());
    }

    #[test]
    fn persisted_layout_uses_camel_case() {
        let mut rec = SessionLogRecorder::new(MemoryStore::new(), "u1");
        rec.record("box", ExerciseType::Breathing, 120, CompletionReason::Expired)
            .unwrap();
        let raw = rec.store().get("session-log:u1").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &json[0];
        assert_eq!(first["exerciseId"], "box");
        assert_eq!(first["exerciseType"], "breathing");
        assert_eq!(first["durationMinutes"], 2);
        assert!(first["id"].is_string());
        assert!(first["date"].is_string());
    }

    #[test]
    fn legacy_items_without_seconds_still_load() {
        let mut store = MemoryStore::new();
        store
            .set(
                "session-log:u1",
                r#"[{"id":"x","date":"2026-01-02T03:04:05Z","exerciseId":"box","exerciseType":"breathing","durationMinutes":5}]"#,
            )
            .unwrap();
        let rec = SessionLogRecorder::new(store, "u1");
        let history = rec.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].duration_seconds, 0);
        assert_eq!(history[0].reason, CompletionReason::Expired);
    }

    #[test]
    fn corrupt_log_is_reported_and_preserved() {
        let mut store = MemoryStore::new();
        store.set("session-log:u1", "{not json").unwrap();
        let mut rec = SessionLogRecorder::new(store, "u1");
        let err = rec
            .record("box", ExerciseType::Breathing, 60, CompletionReason::Expired)
            .unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
        assert_eq!(
            rec.store().get("session-log:u1").unwrap().as_deref(),
            Some("{not json")
        );
    }
}
