/// Habit tools: create, update, delete, mark a day, status and list
///
/// These implement the habit_* MCP tools on top of the tracker.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{add_days, day_key};
use crate::domain::{
    DayStatus, EntryStatus, Habit, HabitPatch, HabitType, NewHabit, StreakSummary,
};
use crate::notify::StreakNotificationSettings;
use crate::tools::{parse_date_or, parse_habit_id, plural, ToolError};
use crate::tracker::Tracker;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit (e.g. "Dry January")
    pub name: String,
    /// Habit type: alcohol, caffeine, sugar or custom
    #[serde(rename = "type")]
    pub habit_type: String,
    /// Display name for custom habits
    pub custom_name: Option<String>,
    /// First tracked day (YYYY-MM-DD, defaults to today)
    pub start_date: Option<String>,
    /// Display color (defaults to #4CAF50)
    pub color: Option<String>,
    /// Schedule milestone notifications (defaults to true)
    pub notifications_enabled: Option<bool>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

/// Create a new habit
pub fn create_habit(
    tracker: &mut Tracker,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let habit_type = HabitType::parse(&params.habit_type)?;
    let start_date = parse_date_or(params.start_date.as_deref(), tracker.clock().today())?;

    let mut new = NewHabit::new(params.name, habit_type, start_date);
    new.custom_name = params.custom_name;
    new.color = params.color;
    new.notifications_enabled = params.notifications_enabled.unwrap_or(true);

    let habit = tracker.create_habit(new)?;
    let message = format!(
        "✅ Created habit '{}' ({}), tracking from {}. Ready to start your streak!\nHabit ID: {}",
        habit.name,
        habit.habit_type.display_name(),
        day_key(habit.start_date),
        habit.id
    );

    Ok(CreateHabitResponse { habit, message })
}

/// Parameters for updating a habit; omitted fields are left unchanged
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    pub name: Option<String>,
    /// Habit type: alcohol, caffeine, sugar or custom
    #[serde(rename = "type")]
    pub habit_type: Option<String>,
    /// Display name for custom habits (empty string clears it)
    pub custom_name: Option<String>,
    /// New first tracked day (YYYY-MM-DD); milestones are rescheduled
    pub start_date: Option<String>,
    /// Pause (false) or resume (true) tracking
    pub is_active: Option<bool>,
    pub color: Option<String>,
    pub notifications_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

pub fn update_habit(
    tracker: &mut Tracker,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    let habit_type = params
        .habit_type
        .as_deref()
        .map(HabitType::parse)
        .transpose()?;
    let start_date = match params.start_date.as_deref() {
        Some(raw) => Some(parse_date_or(Some(raw), tracker.clock().today())?),
        None => None,
    };

    let patch = HabitPatch {
        name: params.name,
        habit_type,
        custom_name: params.custom_name.map(Some),
        start_date,
        is_active: params.is_active,
        color: params.color,
        notifications_enabled: params.notifications_enabled,
    };

    let habit = tracker
        .update_habit(habit_id, patch)?
        .ok_or_else(|| ToolError::HabitNotFound(params.habit_id.clone()))?;

    let message = format!("✏️ Updated habit '{}'", habit.name);
    Ok(UpdateHabitResponse { habit, message })
}

/// Parameters for removing a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to remove
    pub habit_id: String,
    /// Delete the habit and its history instead of archiving it (default false)
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub permanent: bool,
    pub message: String,
}

/// Archive a habit, or delete it with its history when `permanent`
pub fn delete_habit(
    tracker: &mut Tracker,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let name = tracker
        .habit(habit_id)
        .map(|h| h.name.clone())
        .ok_or_else(|| ToolError::HabitNotFound(params.habit_id.clone()))?;

    let message = if params.permanent {
        tracker.delete_habit(habit_id);
        format!("🗑️ Deleted habit '{}' and its history", name)
    } else {
        tracker.deactivate_habit(habit_id);
        format!("⏸️ Archived habit '{}'. History is kept.", name)
    };

    Ok(DeleteHabitResponse {
        permanent: params.permanent,
        message,
    })
}

/// Parameters for recording a day's status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MarkDayParams {
    /// ID of the habit
    pub habit_id: String,
    /// Day to mark (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
    /// success, failure, skip, or none to clear the day
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MarkDayResponse {
    pub streak: StreakSummary,
    pub message: String,
}

pub fn mark_day(tracker: &mut Tracker, params: MarkDayParams) -> Result<MarkDayResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let status = DayStatus::parse(&params.status)?;
    let date = parse_date_or(params.date.as_deref(), tracker.clock().today())?;

    let streak = tracker
        .set_habit_day_status(habit_id, date, status)
        .ok_or_else(|| ToolError::HabitNotFound(params.habit_id.clone()))?;

    let what = match status {
        DayStatus::Set(EntryStatus::Success) => "✅ Marked as success",
        DayStatus::Set(EntryStatus::Failure) => "❌ Marked as failure",
        DayStatus::Set(EntryStatus::Skip) => "⏭️ Marked as skipped",
        DayStatus::None => "🧹 Cleared",
    };
    let message = format!(
        "{} for {}. 🔥 Current streak: {} day{}",
        what,
        day_key(date),
        streak.current_streak,
        plural(streak.current_streak)
    );

    Ok(MarkDayResponse { streak, message })
}

/// Longest history window `habit_status` will return
pub const MAX_RECENT_DAYS: u32 = 366;

/// Parameters for checking habit status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of a specific habit (shows all active habits if omitted)
    pub habit_id: Option<String>,
    /// Include this many recent days of history (default 0, at most 366)
    pub recent_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit: Habit,
    pub streak: StreakSummary,
    pub days_tracked: i64,
    /// `(day, status)` for the requested recent window, oldest first
    pub recent: Vec<(String, EntryStatus)>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habits: Vec<HabitStatus>,
    pub message: String,
}

pub fn habit_status(tracker: &Tracker, params: StatusParams) -> Result<StatusResponse, ToolError> {
    let today = tracker.clock().today();
    let targets: Vec<&Habit> = match params.habit_id.as_deref() {
        Some(raw) => {
            let id = parse_habit_id(raw)?;
            let habit = tracker
                .habit(id)
                .ok_or_else(|| ToolError::HabitNotFound(raw.to_string()))?;
            vec![habit]
        }
        None => tracker.habits(true),
    };

    let recent_days = params.recent_days.unwrap_or(0).min(MAX_RECENT_DAYS);
    let mut habits = Vec::with_capacity(targets.len());
    for habit in targets {
        let streak = tracker
            .streak_summary(habit.id)
            .unwrap_or_else(|| StreakSummary::new(habit.id));
        let recent = if recent_days > 0 {
            let from = add_days(today, -(i64::from(recent_days) - 1));
            tracker
                .day_statuses(habit.id, from, today)
                .into_iter()
                .map(|(date, status)| (day_key(date), status))
                .collect()
        } else {
            Vec::new()
        };
        habits.push(HabitStatus {
            habit: habit.clone(),
            streak,
            days_tracked: habit.days_tracked(today),
            recent,
        });
    }

    let message = if habits.is_empty() {
        "No active habits. Create your first habit to get started!".to_string()
    } else {
        habits
            .iter()
            .map(format_status)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    Ok(StatusResponse { habits, message })
}

fn format_status(status: &HabitStatus) -> String {
    let mut text = format!(
        "🎯 **{}** ({})\n   🔥 Current streak: {} day{} | 🏆 Longest: {} | ✅ Total: {} | 📅 Day {}\n   {}",
        status.habit.name,
        status.habit.habit_type.display_name(),
        status.streak.current_streak,
        plural(status.streak.current_streak),
        status.streak.longest_streak,
        status.streak.total_days,
        status.days_tracked.max(0),
        status.streak.motivational_message()
    );
    if !status.habit.is_active {
        text.push_str("\n   ⏸️ (archived)");
    }
    if !status.recent.is_empty() {
        let recent = status
            .recent
            .iter()
            .map(|(day, s)| format!("{} {}", day, s.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&format!("\n   Recent: {}", recent));
    }
    text.push_str(&format!("\n   Habit ID: {}", status.habit.id));
    text
}

/// Parameters for listing habits
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Show only active habits (default true)
    pub active_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<Habit>,
    pub message: String,
}

/// List habits with fresh streaks
///
/// Loading the list counts as a foreground transition: today is
/// auto-marked and every listed habit's cached streak is recomputed.
pub fn list_habits(tracker: &mut Tracker, params: ListHabitsParams) -> ListHabitsResponse {
    let active_only = params.active_only.unwrap_or(true);
    tracker.auto_mark_today();
    let ids: Vec<_> = tracker.habits(active_only).iter().map(|h| h.id).collect();
    for id in ids {
        tracker.update_habit_streaks(id);
    }

    let habits: Vec<Habit> = tracker
        .habits(active_only)
        .into_iter()
        .cloned()
        .collect();

    let message = if habits.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let lines = habits
            .iter()
            .map(|h| {
                format!(
                    "🎯 **{}** ({}) | 🔥 Streak: {} | 🏆 Longest: {}{}\n   Habit ID: {}",
                    h.name,
                    h.habit_type.display_name(),
                    h.current_streak,
                    h.longest_streak,
                    if h.is_active { "" } else { " ⏸️ (archived)" },
                    h.id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("📋 **Habits** ({})\n\n{}", habits.len(), lines)
    };

    ListHabitsResponse { habits, message }
}

/// Parameters for milestone notification preferences; omitted fields keep
/// their current value
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NotificationSettingsParams {
    pub enabled: Option<bool>,
    /// Local time milestone notifications fire (HH:MM)
    pub time: Option<String>,
    /// Day counts that trigger a notification
    pub milestones: Option<BTreeSet<u32>>,
}

#[derive(Debug, Serialize)]
pub struct NotificationSettingsResponse {
    pub settings: StreakNotificationSettings,
    pub message: String,
}

pub fn notification_settings(
    tracker: &mut Tracker,
    params: NotificationSettingsParams,
) -> Result<NotificationSettingsResponse, ToolError> {
    let changed = params.enabled.is_some() || params.time.is_some() || params.milestones.is_some();
    if changed {
        let mut settings = tracker.streak_notification_settings().clone();
        if let Some(enabled) = params.enabled {
            settings.enabled = enabled;
        }
        if let Some(time) = params.time {
            settings.time = time;
        }
        if let Some(milestones) = params.milestones {
            settings.milestones = milestones;
        }
        tracker.update_streak_notification_settings(settings)?;
    }

    let settings = tracker.streak_notification_settings().clone();
    let days = settings
        .milestones
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let message = format!(
        "🔔 Milestone notifications {} at {} on days: {}",
        if settings.enabled { "on" } else { "off" },
        settings.time,
        days
    );

    Ok(NotificationSettingsResponse { settings, message })
}
