//! Fasting reminders: fast complete and eating window closing.

use chrono::{DateTime, Utc};

use crate::domain::dates::hours;
use crate::domain::{FastingSession, FastingSettings};
use crate::notify::{NotificationContent, ScheduleRequest, Trigger};

fn format_hours(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Reminder for when an in-progress fast reaches its target
///
/// `None` when reminders are off or the target is already behind us.
pub fn fasting_end_request(
    session: &FastingSession,
    settings: &FastingSettings,
    now: DateTime<Utc>,
) -> Option<ScheduleRequest> {
    if !settings.notifications || !session.is_in_progress() {
        return None;
    }

    let at = session.start_time + hours(settings.fasting_hours);
    (at > now).then(|| ScheduleRequest {
        content: NotificationContent::new(
            "Fast complete!",
            format!(
                "You've reached your {}-hour fasting goal. Time to eat.",
                format_hours(settings.fasting_hours)
            ),
        ),
        trigger: Trigger::At(at),
    })
}

/// Reminder for when the eating window after a completed fast closes
pub fn eating_window_end_request(
    session: &FastingSession,
    settings: &FastingSettings,
    now: DateTime<Utc>,
) -> Option<ScheduleRequest> {
    if !settings.notifications {
        return None;
    }
    let end = session.end_time?;

    let at = end + hours(settings.eating_window_hours);
    let body = if settings.is_active {
        "Your eating window is closing. The next fast starts now.".to_string()
    } else {
        format!(
            "Your {}-hour eating window is closing.",
            format_hours(settings.eating_window_hours)
        )
    };

    (at > now).then(|| ScheduleRequest {
        content: NotificationContent::new("Eating window closing", body),
        trigger: Trigger::At(at),
    })
}
