//! Milestone notification content and timing.
//!
//! Content is a fixed lookup of (habit type, day count): each type has a
//! table of thresholds and the highest threshold not above the milestone
//! picks the message.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::domain::dates::{add_days, parse_hhmm};
use crate::domain::{DomainError, Habit, HabitType};
use crate::notify::{NotificationContent, ScheduleRequest, Trigger};

/// Longest milestone we schedule, in days
pub const MAX_MILESTONE_DAYS: u32 = 3650;

fn default_time() -> String {
    "09:00".to_string()
}

fn default_milestones() -> BTreeSet<u32> {
    [3, 7, 14, 30, 60, 90].into_iter().collect()
}

fn default_true() -> bool {
    true
}

/// User-wide milestone notification preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakNotificationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local time of day milestone notifications fire (HH:MM)
    #[serde(default = "default_time")]
    pub time: String,
    /// Day counts that trigger a notification
    #[serde(default = "default_milestones")]
    pub milestones: BTreeSet<u32>,
}

impl Default for StreakNotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_time(),
            milestones: default_milestones(),
        }
    }
}

impl StreakNotificationSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        parse_hhmm(&self.time)?;
        if let Some(bad) = self
            .milestones
            .iter()
            .find(|m| **m == 0 || **m > MAX_MILESTONE_DAYS)
        {
            return Err(DomainError::InvalidValue {
                message: format!(
                    "Milestones must be between 1 and {} days, got {}",
                    MAX_MILESTONE_DAYS, bad
                ),
            });
        }
        Ok(())
    }

    /// Notification time, falling back to 09:00 if the stored value is bad
    pub fn time_of_day(&self) -> NaiveTime {
        parse_hhmm(&self.time).unwrap_or_else(|e| {
            tracing::warn!("{}; using 09:00 for milestone notifications", e);
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
        })
    }
}

type MessageTable = &'static [(u32, &'static str, &'static str)];

// (threshold days, title, body). `{days}` and `{subject}` are substituted.
const ALCOHOL_MESSAGES: MessageTable = &[
    (1, "First alcohol-free day!", "{days} day without a drink. The hardest one is behind you."),
    (3, "3 days alcohol-free", "{days} days in. Your sleep is already starting to improve."),
    (7, "One week alcohol-free!", "{days} days without alcohol. Your liver thanks you."),
    (14, "Two weeks alcohol-free", "{days} days strong. Energy and focus are coming back."),
    (30, "A month alcohol-free!", "{days} days without a drink. That's a real milestone."),
    (90, "Three months alcohol-free", "{days} days. This is who you are now."),
    (365, "A year alcohol-free!", "{days} days without alcohol. Incredible."),
];

const CAFFEINE_MESSAGES: MessageTable = &[
    (1, "First caffeine-free day!", "{days} day done. Headaches fade soon, hang in there."),
    (3, "3 days caffeine-free", "{days} days in. The worst of the withdrawal is usually over."),
    (7, "One week caffeine-free!", "{days} days without caffeine. Natural energy is kicking in."),
    (14, "Two weeks caffeine-free", "{days} days. Your sleep rhythm is resetting."),
    (30, "A month caffeine-free!", "{days} days without caffeine. Nicely done."),
    (90, "Three months caffeine-free", "{days} days. You don't need it anymore."),
];

const SUGAR_MESSAGES: MessageTable = &[
    (1, "First sugar-free day!", "{days} day without added sugar. Great start."),
    (3, "3 days sugar-free", "{days} days in. Cravings peak around now, stay with it."),
    (7, "One week sugar-free!", "{days} days. Your taste buds are recalibrating."),
    (14, "Two weeks sugar-free", "{days} days without sugar. Steadier energy all day."),
    (30, "A month sugar-free!", "{days} days. Fruit tastes sweeter than ever."),
    (90, "Three months sugar-free", "{days} days. A whole new relationship with food."),
];

const CUSTOM_MESSAGES: MessageTable = &[
    (1, "Day one: {subject}", "{days} day done. Every streak starts here."),
    (7, "One week: {subject}", "{days} days in a row. Keep it going!"),
    (30, "One month: {subject}", "{days} days. This is becoming a habit."),
    (90, "Three months: {subject}", "{days} days of commitment. Impressive."),
    (365, "One year: {subject}", "{days} days. Legendary."),
];

fn table_for(habit_type: HabitType) -> MessageTable {
    match habit_type {
        HabitType::Alcohol => ALCOHOL_MESSAGES,
        HabitType::Caffeine => CAFFEINE_MESSAGES,
        HabitType::Sugar => SUGAR_MESSAGES,
        HabitType::Custom => CUSTOM_MESSAGES,
    }
}

/// Message for reaching `days` on a habit of `habit_type`
pub fn milestone_content(habit_type: HabitType, days: u32, subject: &str) -> NotificationContent {
    let table = table_for(habit_type);
    let (_, title, body) = table
        .iter()
        .rev()
        .find(|(threshold, _, _)| *threshold <= days)
        .or_else(|| table.first())
        .copied()
        .unwrap_or((0, "Milestone reached: {subject}", "{days} days and counting."));

    let fill = |template: &str| {
        template
            .replace("{days}", &days.to_string())
            .replace("{subject}", subject)
    };
    NotificationContent::new(fill(title), fill(body))
}

/// Instant a milestone of `days` fires for a habit
pub fn milestone_trigger_time(
    habit: &Habit,
    days: u32,
    time_of_day: NaiveTime,
    clock: &dyn Clock,
) -> DateTime<Utc> {
    let date = add_days(habit.start_date, i64::from(days));
    clock.local_to_utc(date.and_time(time_of_day))
}

/// Milestone notifications that should be pending for `habit`
///
/// Empty when notifications are disabled globally or for the habit, or
/// the habit is inactive. Milestones whose moment has already passed are
/// dropped, so moving the start date back only schedules what is still
/// ahead.
pub fn milestone_requests(
    habit: &Habit,
    settings: &StreakNotificationSettings,
    clock: &dyn Clock,
) -> Vec<ScheduleRequest> {
    if !settings.enabled || !habit.notifications_enabled || !habit.is_active {
        return Vec::new();
    }

    let now = clock.now();
    let time_of_day = settings.time_of_day();
    let subject = habit.subject();

    settings
        .milestones
        .iter()
        .filter(|days| **days > 0)
        .filter_map(|days| {
            let at = milestone_trigger_time(habit, *days, time_of_day, clock);
            (at > now).then(|| ScheduleRequest {
                content: milestone_content(habit.habit_type, *days, &subject),
                trigger: Trigger::At(at),
            })
        })
        .collect()
}
