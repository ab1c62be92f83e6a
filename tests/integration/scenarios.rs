/// End-to-end tracker scenarios
use std::sync::Arc;

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use habit_fasting_tracker::*;

struct Harness {
    tracker: Tracker,
    clock: Arc<FixedClock>,
    scheduler: Arc<RecordingScheduler>,
}

fn harness_at(now: chrono::DateTime<Utc>) -> Harness {
    let clock = Arc::new(FixedClock::new(now));
    let scheduler = Arc::new(RecordingScheduler::new());
    let tracker = Tracker::open(
        Arc::new(MemoryKvStore::new()),
        scheduler.clone(),
        clock.clone(),
    );
    Harness {
        tracker,
        clock,
        scheduler,
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_streak_rises_and_falls_with_today() {
        let mut h = harness_at(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        let today = h.clock.today();
        let habit = h
            .tracker
            .create_habit(NewHabit::new("Dry January", HabitType::Alcohol, today))
            .unwrap();
        assert_eq!(h.tracker.current_streak(habit.id), Some(0));

        h.tracker
            .set_habit_day_status(habit.id, today, DayStatus::Set(EntryStatus::Success));
        assert_eq!(h.tracker.current_streak(habit.id), Some(1));

        h.tracker
            .set_habit_day_status(habit.id, today, DayStatus::Set(EntryStatus::Failure));
        assert_eq!(h.tracker.current_streak(habit.id), Some(0));
        assert_eq!(h.tracker.habit(habit.id).unwrap().current_streak, 0);
        assert_eq!(h.tracker.entries().entries_for(habit.id, today).len(), 1);
    }

    #[test]
    fn test_first_fast_auto_started() {
        let mut h = harness_at(Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap());
        h.tracker
            .update_fasting_settings(FastingSettings {
                is_active: true,
                ..Default::default()
            })
            .unwrap();

        let session = h.tracker.reconcile_and_get_current_session().unwrap();
        assert_eq!(session.duration, 16.0);
        assert!(!session.completed);
        assert_eq!(session.start_time, h.clock.now());
    }

    #[test]
    fn test_full_fasting_cycle_over_two_days() {
        let mut h = harness_at(Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap());
        h.tracker
            .update_fasting_settings(FastingSettings {
                is_active: true,
                ..Default::default()
            })
            .unwrap();

        let first = h.tracker.reconcile_and_get_current_session().unwrap();
        h.clock.advance(Duration::hours(17));
        let ended = h.tracker.end_fasting_session().unwrap();
        assert_eq!(ended.id, first.id);
        assert!((ended.duration - 17.0).abs() < 0.01);

        // Still inside the eating window
        h.clock.advance(Duration::hours(4));
        assert!(h.tracker.reconcile_and_get_current_session().is_none());
        assert!(matches!(
            h.tracker.fasting_phase(),
            FastingPhase::EatingWindow { .. }
        ));

        // Window over: the app resumes and the next fast begins
        h.clock.advance(Duration::hours(5));
        let report = h.tracker.on_resume();
        assert!(report.started_fast);
        let second = report.current_session.unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(h.tracker.fasting_history(None).len(), 2);
        assert_eq!(
            h.tracker
                .fasting_history(None)
                .iter()
                .filter(|s| !s.completed)
                .count(),
            1
        );
    }

    #[test]
    fn test_skip_days_bridge_a_streak() {
        let mut h = harness_at(Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap());
        let today = h.clock.today();
        let habit = h
            .tracker
            .create_habit(NewHabit::new(
                "No sugar",
                HabitType::Sugar,
                today - Duration::days(6),
            ))
            .unwrap();

        let marks = [
            (6, EntryStatus::Success),
            (5, EntryStatus::Success),
            (4, EntryStatus::Skip),
            (3, EntryStatus::Success),
            (2, EntryStatus::Skip),
            (1, EntryStatus::Success),
            (0, EntryStatus::Success),
        ];
        for (days_ago, status) in marks {
            h.tracker.set_habit_day_status(
                habit.id,
                today - Duration::days(days_ago),
                status.into(),
            );
        }

        let summary = h.tracker.streak_summary(habit.id).unwrap();
        assert_eq!(summary.current_streak, 5);
        assert_eq!(summary.longest_streak, 5);
        assert_eq!(summary.total_days, 5);
    }

    #[test]
    fn test_today_follows_local_offset() {
        // 23:30 UTC is already the next day in UTC+2
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let clock = Arc::new(FixedClock::with_offset(
            now,
            FixedOffset::east_opt(2 * 3600).unwrap(),
        ));
        let mut tracker = Tracker::open(
            Arc::new(MemoryKvStore::new()),
            Arc::new(RecordingScheduler::new()),
            clock.clone(),
        );
        let habit = tracker
            .create_habit(NewHabit::new("No coffee", HabitType::Caffeine, clock.today()))
            .unwrap();

        tracker.auto_mark_today();
        let local_day = chrono::NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(tracker.entries().entries_for(habit.id, local_day).len(), 1);
    }

    #[test]
    fn test_milestones_track_start_date_and_deletion() {
        let mut h = harness_at(Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap());
        let today = h.clock.today();
        let habit = h
            .tracker
            .create_habit(NewHabit::new("Dry April", HabitType::Alcohol, today))
            .unwrap();
        let pending = h.scheduler.pending();
        assert_eq!(pending.len(), 6);
        assert!(pending
            .iter()
            .any(|n| n.content.title == "One week alcohol-free!"));

        // Moving the start back 40 days leaves 60 and 90 ahead
        h.tracker
            .update_habit(
                habit.id,
                HabitPatch {
                    start_date: Some(today - Duration::days(40)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(h.scheduler.pending().len(), 2);

        h.tracker.delete_habit(habit.id);
        assert!(h.scheduler.pending().is_empty());
    }

    #[test]
    fn test_notification_failures_never_block_the_core() {
        let mut h = harness_at(Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap());
        h.scheduler.set_failing(true);

        let habit = h
            .tracker
            .create_habit(NewHabit::new("No sugar", HabitType::Sugar, h.clock.today()))
            .unwrap();
        let session = h.tracker.start_fasting_session();
        h.clock.advance(Duration::hours(16));
        assert!(h.tracker.end_fasting_session().is_some());
        assert!(h.tracker.delete_habit(habit.id));
        assert!(h.tracker.delete_fasting_session(session.id));
    }
}
