/// Persistence tests: reloading from SQLite and surviving bad data
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use habit_fasting_tracker::storage::keys;
use habit_fasting_tracker::*;
use tempfile::TempDir;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap(),
    ))
}

fn open_sqlite(dir: &TempDir, clock: Arc<FixedClock>) -> Tracker {
    let store = SqliteKvStore::new(dir.path().join("tracker.db")).expect("Failed to open store");
    Tracker::open(Arc::new(store), Arc::new(RecordingScheduler::new()), clock)
}

#[cfg(test)]
mod persistence_tests {
    use super::*;

    #[test]
    fn test_state_survives_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let clock = clock();
        let today = clock.today();

        let (habit_id, session_id) = {
            let mut tracker = open_sqlite(&dir, clock.clone());
            let habit = tracker
                .create_habit(NewHabit::new("No soda", HabitType::Sugar, today))
                .unwrap();
            tracker.set_habit_day_status(habit.id, today, EntryStatus::Success.into());
            tracker
                .update_fasting_settings(FastingSettings {
                    fasting_hours: 18.0,
                    eating_window_hours: 6.0,
                    ..Default::default()
                })
                .unwrap();
            let session = tracker.start_fasting_session();
            (habit.id, session.id)
        };

        let tracker = open_sqlite(&dir, clock);
        let habit = tracker.habit(habit_id).expect("habit should be reloaded");
        assert_eq!(habit.name, "No soda");
        assert_eq!(habit.current_streak, 1);
        assert_eq!(tracker.current_streak(habit_id), Some(1));
        assert_eq!(tracker.fasting_settings().fasting_hours, 18.0);
        assert_eq!(tracker.peek_current_session().map(|s| s.id), Some(session_id));
        assert_eq!(tracker.peek_current_session().map(|s| s.duration), Some(18.0));
        assert!(!tracker.notification_registry().is_empty());
    }

    #[test]
    fn test_collections_use_camel_case_keys() {
        let store = Arc::new(MemoryKvStore::new());
        let clock = clock();
        let mut tracker = Tracker::open(store.clone(), Arc::new(RecordingScheduler::new()), clock.clone());
        let habit = tracker
            .create_habit(NewHabit::new("No coffee", HabitType::Caffeine, clock.today()))
            .unwrap();
        tracker.set_habit_day_status(habit.id, clock.today(), EntryStatus::Skip.into());

        let raw = store.get(keys::HABIT_ENTRIES).unwrap().unwrap();
        let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries[0]["habitId"], habit.id.to_string());
        assert_eq!(entries[0]["date"], "2024-06-20");
        assert_eq!(entries[0]["status"], "skip");

        let raw = store.get(keys::HABITS).unwrap().unwrap();
        let habits: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(habits[0]["type"], "caffeine");
        assert_eq!(habits[0]["startDate"], "2024-06-20");
    }

    #[test]
    fn test_malformed_collections_load_as_empty() {
        let store = Arc::new(MemoryKvStore::new());
        store.set(keys::HABITS, "[{\"id\": 42").unwrap();
        store.set(keys::FASTING_SETTINGS, "\"sixteen\"").unwrap();
        store.set(keys::FASTING_SESSIONS, "not json").unwrap();

        let mut tracker = Tracker::open(store, Arc::new(RecordingScheduler::new()), clock());
        assert!(tracker.habits(false).is_empty());
        assert_eq!(tracker.fasting_settings(), &FastingSettings::default());
        assert!(tracker.fasting_history(None).is_empty());

        // And the tracker keeps working on top of it
        let clock_today = tracker.clock().today();
        assert!(tracker
            .create_habit(NewHabit::new("Fresh start", HabitType::Custom, clock_today))
            .is_ok());
    }

    #[test]
    fn test_unreadable_habits_do_not_erase_history() {
        let store = Arc::new(MemoryKvStore::new());
        let clock = clock();
        let today = clock.today();
        let habit_id = {
            let mut tracker =
                Tracker::open(store.clone(), Arc::new(RecordingScheduler::new()), clock.clone());
            let habit = tracker
                .create_habit(NewHabit::new(
                    "No sugar",
                    HabitType::Sugar,
                    today - Duration::days(9),
                ))
                .unwrap();
            for days_ago in 0..10 {
                tracker.set_habit_day_status(
                    habit.id,
                    today - Duration::days(days_ago),
                    EntryStatus::Success.into(),
                );
            }
            habit.id
        };
        let saved_habits = store.get(keys::HABITS).unwrap().unwrap();

        // One open while the habit list is corrupt
        store.set(keys::HABITS, "{corrupt").unwrap();
        let tracker = Tracker::open(store.clone(), Arc::new(RecordingScheduler::new()), clock.clone());
        assert!(tracker.habits(false).is_empty());
        assert_eq!(tracker.entries().len(), 10);
        drop(tracker);

        let raw = store.get(keys::HABIT_ENTRIES).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.as_array().map(|a| a.len()), Some(10));

        store.set(keys::HABITS, &saved_habits).unwrap();
        let recovered = Tracker::open(store, Arc::new(RecordingScheduler::new()), clock);
        assert_eq!(recovered.entries().len(), 10);
        assert_eq!(recovered.current_streak(habit_id), Some(10));
    }

    #[test]
    fn test_failed_writes_keep_memory_state() {
        let store = Arc::new(MemoryKvStore::new());
        let clock = clock();
        let mut tracker = Tracker::open(store.clone(), Arc::new(RecordingScheduler::new()), clock.clone());
        store.fail_writes(true);

        let habit = tracker
            .create_habit(NewHabit::new("No sugar", HabitType::Sugar, clock.today()))
            .unwrap();
        tracker.set_habit_day_status(habit.id, clock.today(), EntryStatus::Success.into());
        assert_eq!(tracker.current_streak(habit.id), Some(1));
        assert_eq!(store.get(keys::HABITS).unwrap(), None);

        // Once writes recover, the next mutation persists the full collection
        store.fail_writes(false);
        clock.advance(Duration::days(1));
        tracker.set_habit_day_status(habit.id, clock.today(), EntryStatus::Success.into());

        let reopened = Tracker::open(store, Arc::new(RecordingScheduler::new()), clock);
        assert_eq!(reopened.entries().len(), 2);
        assert_eq!(reopened.current_streak(habit.id), Some(2));
    }

    #[test]
    fn test_sqlite_store_round_trips_values() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("kv.db");
        {
            let store = SqliteKvStore::new(path.clone()).unwrap();
            store.set(keys::NOTIFICATION_IDS, "{}").unwrap();
            store.set(keys::NOTIFICATION_IDS, "{\"a\":[]}").unwrap();
        }
        let store = SqliteKvStore::new(path).unwrap();
        assert_eq!(
            store.get(keys::NOTIFICATION_IDS).unwrap().as_deref(),
            Some("{\"a\":[]}")
        );
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
