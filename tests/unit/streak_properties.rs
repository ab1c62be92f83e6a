/// Streak calculation properties over every short day sequence
use chrono::{Duration, NaiveDate};
use habit_fasting_tracker::*;

/// A day is unmarked, or carries one of the three statuses
const MARKS: [Option<EntryStatus>; 4] = [
    None,
    Some(EntryStatus::Success),
    Some(EntryStatus::Failure),
    Some(EntryStatus::Skip),
];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
}

/// Every sequence of `len` days ending today; index 0 is the oldest day
fn all_sequences(len: u32) -> Vec<Vec<Option<EntryStatus>>> {
    (0..4usize.pow(len))
        .map(|mut n| {
            (0..len)
                .map(|_| {
                    let mark = MARKS[n % 4];
                    n /= 4;
                    mark
                })
                .collect()
        })
        .collect()
}

fn to_entries(habit_id: HabitId, marks: &[Option<EntryStatus>]) -> Vec<HabitEntry> {
    let first = today() - Duration::days(marks.len() as i64 - 1);
    marks
        .iter()
        .enumerate()
        .filter_map(|(i, mark)| {
            mark.map(|status| HabitEntry::new(habit_id, first + Duration::days(i as i64), status))
        })
        .collect()
}

#[cfg(test)]
mod streak_property_tests {
    use super::*;

    #[test]
    fn test_longest_never_below_current() {
        let habit_id = HabitId::new();
        for marks in all_sequences(6) {
            let entries = to_entries(habit_id, &marks);
            let summary = StreakSummary::calculate(habit_id, &entries, today());
            assert!(
                summary.longest_streak >= summary.current_streak,
                "{:?} gave {:?}",
                marks,
                summary
            );
        }
    }

    #[test]
    fn test_totals_count_successes() {
        let habit_id = HabitId::new();
        for marks in all_sequences(6) {
            let entries = to_entries(habit_id, &marks);
            let summary = StreakSummary::calculate(habit_id, &entries, today());
            let successes = marks
                .iter()
                .filter(|m| **m == Some(EntryStatus::Success))
                .count() as u32;

            assert_eq!(summary.total_days, successes);
            assert!(summary.current_streak <= successes);
            assert_eq!(summary.last_success.is_some(), successes > 0);
        }
    }

    #[test]
    fn test_today_failure_or_unmarked_means_zero() {
        let habit_id = HabitId::new();
        for marks in all_sequences(5) {
            if matches!(marks.last(), Some(None) | Some(Some(EntryStatus::Failure))) {
                let entries = to_entries(habit_id, &marks);
                assert_eq!(current_streak(&entries, today()), 0, "{:?}", marks);
            }
        }
    }

    #[test]
    fn test_skip_today_defers_to_yesterday() {
        let habit_id = HabitId::new();
        let yesterday = today() - Duration::days(1);
        for marks in all_sequences(5) {
            let mut with_skip = marks.clone();
            with_skip.push(Some(EntryStatus::Skip));
            let entries = to_entries(habit_id, &with_skip);
            let without_today: Vec<HabitEntry> = entries
                .iter()
                .filter(|e| e.date != today())
                .cloned()
                .collect();

            assert_eq!(
                current_streak(&entries, today()),
                current_streak(&without_today, yesterday),
                "{:?}",
                marks
            );
        }
    }

    #[test]
    fn test_a_failure_caps_the_current_streak() {
        let habit_id = HabitId::new();
        for marks in all_sequences(6) {
            let Some(failure_index) = marks
                .iter()
                .rposition(|m| *m == Some(EntryStatus::Failure))
            else {
                continue;
            };
            let entries = to_entries(habit_id, &marks);
            let after_failure = marks.len() - 1 - failure_index;
            assert!(current_streak(&entries, today()) as usize <= after_failure);
        }
    }

    #[test]
    fn test_gap_restarts_longest_run() {
        let habit_id = HabitId::new();
        let marks = [
            Some(EntryStatus::Success),
            Some(EntryStatus::Success),
            Some(EntryStatus::Success),
            None,
            Some(EntryStatus::Success),
            Some(EntryStatus::Success),
        ];
        let entries = to_entries(habit_id, &marks);
        assert_eq!(longest_success_run(&entries), 3);
        assert_eq!(current_streak(&entries, today()), 2);
    }

    #[test]
    fn test_order_does_not_matter() {
        let habit_id = HabitId::new();
        for marks in all_sequences(5) {
            let entries = to_entries(habit_id, &marks);
            let mut reversed = entries.clone();
            reversed.reverse();
            assert_eq!(
                StreakSummary::calculate(habit_id, &entries, today()),
                StreakSummary::calculate(habit_id, &reversed, today())
            );
        }
    }
}
