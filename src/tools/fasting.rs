/// Fasting tools: start, end, status, settings and session removal

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{FastingPhase, FastingProgress, FastingSession, FastingSettings};
use crate::tools::{parse_session_id, ToolError};
use crate::tracker::Tracker;

fn format_instant(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// The fast tools take no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EmptyParams {}

#[derive(Debug, Serialize)]
pub struct FastingSessionResponse {
    pub session: Option<FastingSession>,
    pub message: String,
}

/// Start a fast now; an already running fast is returned as is
pub fn start_fast(tracker: &mut Tracker) -> FastingSessionResponse {
    let already_running = tracker.peek_current_session().is_some();
    let session = tracker.start_fasting_session();

    let message = if already_running {
        format!(
            "⏳ A fast is already in progress since {}.\nSession ID: {}",
            format_instant(session.start_time),
            session.id
        )
    } else {
        format!(
            "🍽️ Started a {}-hour fast at {}.\nSession ID: {}",
            session.duration,
            format_instant(session.start_time),
            session.id
        )
    };

    FastingSessionResponse {
        session: Some(session),
        message,
    }
}

/// End the fast in progress
pub fn end_fast(tracker: &mut Tracker) -> FastingSessionResponse {
    match tracker.end_fasting_session() {
        Some(session) => {
            let message = format!(
                "✅ Fast complete after {:.1} hours. Eating window: {} hours.\nSession ID: {}",
                session.duration,
                tracker.fasting_settings().eating_window_hours,
                session.id
            );
            FastingSessionResponse {
                session: Some(session),
                message,
            }
        }
        None => FastingSessionResponse {
            session: None,
            message: "No fast in progress.".to_string(),
        },
    }
}

/// Parameters for checking fasting status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FastingStatusParams {
    /// Include this many most recent sessions (default 0)
    pub history: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FastingStatusResponse {
    pub phase: FastingPhase,
    pub session: Option<FastingSession>,
    pub progress: Option<FastingProgress>,
    pub history: Vec<FastingSession>,
    pub message: String,
}

/// Current phase and progress
///
/// Reconciles the cycle first, so with auto-cycling on this may start the
/// next fast.
pub fn fasting_status(tracker: &mut Tracker, params: FastingStatusParams) -> FastingStatusResponse {
    let session = tracker.reconcile_and_get_current_session();
    let progress = session.as_ref().map(|s| tracker.fasting_progress(s));
    let phase = tracker.fasting_phase();
    let history: Vec<FastingSession> = match params.history {
        Some(limit) if limit > 0 => tracker
            .fasting_history(Some(limit))
            .into_iter()
            .cloned()
            .collect(),
        _ => Vec::new(),
    };

    let mut message = match (&phase, &progress) {
        (FastingPhase::Fasting { .. }, Some(progress)) => {
            let remaining = if progress.is_complete {
                format!("🎉 Target reached {:.1}h ago", -progress.remaining_hours)
            } else {
                format!("{:.1}h to go", progress.remaining_hours)
            };
            format!(
                "⏳ Fasting: {:.1}h elapsed ({:.0}%). {}",
                progress.elapsed_hours, progress.progress_percent, remaining
            )
        }
        (FastingPhase::EatingWindow { ends_at, .. }, _) => {
            format!("🍽️ Eating window open until {}", format_instant(*ends_at))
        }
        _ => "💤 Not fasting.".to_string(),
    };
    if !history.is_empty() {
        let lines = history
            .iter()
            .map(|s| {
                format!(
                    "- {} {:.1}h{}",
                    format_instant(s.start_time),
                    s.duration,
                    if s.completed { "" } else { " (in progress)" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        message.push_str(&format!("\n\nRecent fasts:\n{}", lines));
    }

    FastingStatusResponse {
        phase,
        session,
        progress,
        history,
        message,
    }
}

/// Parameters for the fasting schedule; omitted fields keep their value
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FastingSettingsParams {
    /// Planned length of each fast in hours
    pub fasting_hours: Option<f64>,
    /// Eating window between fasts in hours
    pub eating_window_hours: Option<f64>,
    /// Preferred start time (HH:MM)
    pub start_time: Option<String>,
    /// Auto-cycling: start the next fast when the eating window ends
    pub is_active: Option<bool>,
    /// Schedule fast-complete and window-closing reminders
    pub notifications: Option<bool>,
    /// Preferred reminder time (HH:MM)
    pub notification_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FastingSettingsResponse {
    pub settings: FastingSettings,
    pub message: String,
}

/// Show or change the fasting schedule
pub fn fasting_settings(
    tracker: &mut Tracker,
    params: FastingSettingsParams,
) -> Result<FastingSettingsResponse, ToolError> {
    let mut settings = tracker.fasting_settings().clone();
    let before = settings.clone();

    if let Some(hours) = params.fasting_hours {
        settings.fasting_hours = hours;
    }
    if let Some(hours) = params.eating_window_hours {
        settings.eating_window_hours = hours;
    }
    if let Some(time) = params.start_time {
        settings.start_time = time;
    }
    if let Some(active) = params.is_active {
        settings.is_active = active;
    }
    if let Some(notifications) = params.notifications {
        settings.notifications = notifications;
    }
    if let Some(time) = params.notification_time {
        settings.notification_time = time;
    }

    if settings != before {
        tracker.update_fasting_settings(settings)?;
    }

    let settings = tracker.fasting_settings().clone();
    let message = format!(
        "⚙️ Fasting schedule: {}h fast / {}h eating window ({}h cycle), auto-cycle {}, reminders {}",
        settings.fasting_hours,
        settings.eating_window_hours,
        settings.cycle_hours(),
        if settings.is_active { "on" } else { "off" },
        if settings.notifications { "on" } else { "off" }
    );

    Ok(FastingSettingsResponse { settings, message })
}

/// Parameters for removing a fasting session from history
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteSessionParams {
    pub session_id: String,
}

pub fn delete_session(tracker: &mut Tracker, params: DeleteSessionParams) -> Result<String, ToolError> {
    let id = parse_session_id(&params.session_id)?;
    if tracker.delete_fasting_session(id) {
        Ok(format!("🗑️ Deleted fasting session {}", id))
    } else {
        Err(ToolError::SessionNotFound(params.session_id))
    }
}
