/// Streak calculation and tracking functionality
///
/// This module derives a habit's current streak, longest streak and total
/// successful days from its entries. Everything here is a pure function of
/// (entries, today); callers recompute on demand instead of maintaining
/// counters incrementally.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitEntry, HabitId};

/// Calculated streak information for a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Consecutive successful days walked back from today
    pub current_streak: u32,
    /// Best streak ever achieved; never below `current_streak`
    pub longest_streak: u32,
    /// Lifetime count of successful days
    pub total_days: u32,
    /// Most recent day marked success (None if never)
    pub last_success: Option<NaiveDate>,
}

impl StreakSummary {
    /// Create an empty summary for a habit with no entries
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            total_days: 0,
            last_success: None,
        }
    }

    /// Calculate streak information from a habit's entries
    ///
    /// Skip days count toward the current streak's continuity but are
    /// gaps for the sorted longest-run scan, so the longest streak is
    /// clamped up to the current one.
    pub fn calculate<'a>(
        habit_id: HabitId,
        entries: impl IntoIterator<Item = &'a HabitEntry>,
        today: NaiveDate,
    ) -> Self {
        let entries: Vec<&HabitEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return Self::new(habit_id);
        }

        let current_streak = current_streak(entries.iter().copied(), today);
        let longest_streak = longest_success_run(entries.iter().copied());
        let last_success = entries
            .iter()
            .filter(|e| e.is_success())
            .map(|e| e.date)
            .max();

        Self {
            habit_id,
            current_streak,
            longest_streak: longest_streak.max(current_streak),
            total_days: total_days(entries.iter().copied()),
            last_success,
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }
}

/// Count consecutive successful days ending at `today`
///
/// The walk starts strictly at today. Skip days are transparent wherever
/// they appear; the count stops at the first day that is a failure or has
/// no entry at all. A today that is neither success nor skip yields 0.
pub fn current_streak<'a>(
    entries: impl IntoIterator<Item = &'a HabitEntry>,
    today: NaiveDate,
) -> u32 {
    let mut success_days = HashSet::new();
    let mut skip_days = HashSet::new();
    for entry in entries {
        if entry.is_success() {
            success_days.insert(entry.date);
        } else if entry.is_skip() {
            skip_days.insert(entry.date);
        }
    }

    let mut streak = 0;
    let mut day = today;
    // Both sets are finite, so the walk always reaches an unmarked day.
    loop {
        if success_days.contains(&day) {
            streak += 1;
        } else if !skip_days.contains(&day) {
            break;
        }
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }

    streak
}

/// Longest run of success entries on consecutive calendar days
///
/// Entries are sorted ascending; a one-day gap extends the run and any
/// other gap (including a same-day duplicate) restarts it at 1.
pub fn longest_success_run<'a>(entries: impl IntoIterator<Item = &'a HabitEntry>) -> u32 {
    let mut dates: Vec<NaiveDate> = entries
        .into_iter()
        .filter(|e| e.is_success())
        .map(|e| e.date)
        .collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort();

    let mut longest = 0;
    let mut running = 1;
    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            running += 1;
        } else {
            longest = longest.max(running);
            running = 1;
        }
    }

    longest.max(running)
}

/// Lifetime number of success entries
pub fn total_days<'a>(entries: impl IntoIterator<Item = &'a HabitEntry>) -> u32 {
    entries.into_iter().filter(|e| e.is_success()).count() as u32
}
