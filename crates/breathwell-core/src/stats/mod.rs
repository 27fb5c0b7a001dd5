//! Summary statistics over a user's session log.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionLogItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total_sessions: u64,
    /// Sum of the logged (floored) minute values.
    pub total_minutes: u64,
    pub total_seconds: u64,
    pub sessions_today: u64,
    pub minutes_today: u64,
    /// Session count per exercise type.
    pub by_type: BTreeMap<String, u64>,
    /// Consecutive UTC days with at least one session, ending today or
    /// yesterday.
    pub current_streak_days: u32,
    pub last_session: Option<DateTime<Utc>>,
}

impl LogSummary {
    pub fn from_items(items: &[SessionLogItem], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let mut summary = LogSummary::default();
        let mut days = HashSet::new();

        for item in items {
            summary.total_sessions += 1;
            summary.total_minutes += u64::from(item.duration_minutes);
            summary.total_seconds += u64::from(item.duration_seconds);
            *summary
                .by_type
                .entry(item.exercise_type.to_string())
                .or_insert(0) += 1;

            let day = item.date.date_naive();
            if day == today {
                summary.sessions_today += 1;
                summary.minutes_today += u64::from(item.duration_minutes);
            }
            days.insert(day);

            if summary.last_session.map_or(true, |last| item.date > last) {
                summary.last_session = Some(item.date);
            }
        }

        summary.current_streak_days = streak(&days, today);
        summary
    }
}

fn streak(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today.checked_sub_days(Days::new(1));
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        yesterday.filter(|d| days.contains(d))
    };

    let mut count = 0;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        count += 1;
        cursor = day.checked_sub_days(Days::new(1));
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CompletionReason, ExerciseType};
    use chrono::{Duration, TimeZone};

    fn item(date: DateTime<Utc>, kind: ExerciseType, secs: u32) -> SessionLogItem {
        SessionLogItem {
            id: format!("{}", date.timestamp()),
            date,
            exercise_id: "box".into(),
            exercise_type: kind,
            duration_minutes: secs / 60,
            duration_seconds: secs,
            reason: CompletionReason::Expired,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_log() {
        let s = LogSummary::from_items(&[], now());
        assert_eq!(s, LogSummary::default());
    }

    #[test]
    fn totals_and_today() {
        let n = now();
        let items = vec![
            item(n - Duration::hours(1), ExerciseType::Breathing, 240),
            item(n - Duration::days(1), ExerciseType::Mindfulness, 600),
            item(n - Duration::minutes(5), ExerciseType::Breathing, 45),
        ];
        let s = LogSummary::from_items(&items, n);
        assert_eq!(s.total_sessions, 3);
        assert_eq!(s.total_minutes, 4 + 10);
        assert_eq!(s.total_seconds, 885);
        assert_eq!(s.sessions_today, 2);
        assert_eq!(s.minutes_today, 4);
        assert_eq!(s.by_type.get("breathing"), Some(&2));
        assert_eq!(s.by_type.get("mindfulness"), Some(&1));
        assert_eq!(s.last_session, Some(n - Duration::minutes(5)));
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let n = now();
        let items: Vec<_> = [0, 1, 2, 4]
            .iter()
            .map(|d| item(n - Duration::days(*d), ExerciseType::Breathing, 60))
            .collect();
        assert_eq!(LogSummary::from_items(&items, n).current_streak_days, 3);
    }

    #[test]
    fn streak_may_end_yesterday() {
        let n = now();
        let items: Vec<_> = [1, 2]
            .iter()
            .map(|d| item(n - Duration::days(*d), ExerciseType::Breathing, 60))
            .collect();
        assert_eq!(LogSummary::from_items(&items, n).current_streak_days, 2);
    }

    #[test]
    fn streak_broken_two_days_ago() {
        let n = now();
        let items = vec![item(n - Duration::days(2), ExerciseType::Breathing, 60)];
        assert_eq!(LogSummary::from_items(&items, n).current_streak_days, 0);
    }
}
