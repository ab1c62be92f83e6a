//! Intermittent-fasting settings, sessions and progress maths.
//!
//! The state machine that starts and ends sessions lives on the tracker;
//! this module only holds the records and the pure calculations over them.
//!
//! ## Phases
//!
//! ```text
//! Idle -> Fasting -> EatingWindow -> (auto-cycling) Fasting -> ...
//! ```
//!
//! `EatingWindow` is never stored. It is derived from the latest completed
//! session: the window runs for `eating_window_hours` from its end time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dates::{hours, hours_between, parse_hhmm};
use crate::domain::{DomainError, SessionId};

/// Longest fast or eating window we accept, in hours
pub const MAX_PHASE_HOURS: f64 = 168.0;

fn default_fasting_hours() -> f64 {
    16.0
}

fn default_eating_window_hours() -> f64 {
    8.0
}

fn default_start_time() -> String {
    "20:00".to_string()
}

fn default_true() -> bool {
    true
}

/// The single fasting schedule for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingSettings {
    /// Planned length of each fast
    #[serde(default = "default_fasting_hours")]
    pub fasting_hours: f64,
    /// Length of the eating window between fasts
    #[serde(default = "default_eating_window_hours")]
    pub eating_window_hours: f64,
    /// Preferred local start time (HH:MM); informational only
    #[serde(default = "default_start_time")]
    pub start_time: String,
    /// Auto-cycling: start the next fast once the eating window has elapsed
    #[serde(default)]
    pub is_active: bool,
    /// Whether fast-complete / window-closing reminders are scheduled
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Preferred local reminder time (HH:MM)
    #[serde(default = "default_start_time")]
    pub notification_time: String,
}

impl Default for FastingSettings {
    fn default() -> Self {
        Self {
            fasting_hours: default_fasting_hours(),
            eating_window_hours: default_eating_window_hours(),
            start_time: default_start_time(),
            is_active: false,
            notifications: true,
            notification_time: default_start_time(),
        }
    }
}

impl FastingSettings {
    /// Validate the schedule
    ///
    /// Both phases must be positive and at most a week long. Their sum is
    /// not tied to 24; cycles are anchored on the previous fast's end time.
    pub fn validate(&self) -> Result<(), DomainError> {
        Self::validate_phase("fastingHours", self.fasting_hours)?;
        Self::validate_phase("eatingWindowHours", self.eating_window_hours)?;
        parse_hhmm(&self.start_time)?;
        parse_hhmm(&self.notification_time)?;
        Ok(())
    }

    /// Nominal cycle length (fast plus eating window)
    pub fn cycle_hours(&self) -> f64 {
        self.fasting_hours + self.eating_window_hours
    }

    fn validate_phase(field: &str, value: f64) -> Result<(), DomainError> {
        if !value.is_finite() || value <= 0.0 || value > MAX_PHASE_HOURS {
            return Err(DomainError::InvalidValue {
                message: format!(
                    "{} must be greater than 0 and at most {} hours, got {}",
                    field, MAX_PHASE_HOURS, value
                ),
            });
        }
        Ok(())
    }
}

/// One fast, in progress or completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingSession {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    /// Absent while the fast is in progress
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Planned hours while in progress; actual hours once completed
    pub duration: f64,
    pub completed: bool,
}

impl FastingSession {
    /// Start a fast now, planning `fasting_hours`
    pub fn start(now: DateTime<Utc>, fasting_hours: f64) -> Self {
        Self {
            id: SessionId::new(),
            start_time: now,
            end_time: None,
            duration: fasting_hours,
            completed: false,
        }
    }

    /// Complete the fast, replacing the planned duration with the real one
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.end_time = Some(now);
        self.duration = hours_between(self.start_time, now);
        self.completed = true;
    }

    pub fn is_in_progress(&self) -> bool {
        !self.completed
    }

    pub fn elapsed_hours(&self, now: DateTime<Utc>) -> f64 {
        hours_between(self.start_time, self.end_time.unwrap_or(now))
    }

    /// When the planned fast is due to finish
    pub fn planned_end(&self) -> DateTime<Utc> {
        self.start_time + hours(self.duration)
    }
}

/// Progress of an in-progress fast against the configured target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FastingProgress {
    pub elapsed_hours: f64,
    /// Negative once the target has been passed
    pub remaining_hours: f64,
    /// 0 to 100
    pub progress_percent: f64,
    /// Target reached; the session stays open until ended or auto-cycled
    pub is_complete: bool,
}

impl FastingProgress {
    pub fn calculate(session: &FastingSession, fasting_hours: f64, now: DateTime<Utc>) -> Self {
        let elapsed_hours = session.elapsed_hours(now);
        let remaining_hours = fasting_hours - elapsed_hours;
        let ratio = if fasting_hours > 0.0 {
            (elapsed_hours / fasting_hours).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self {
            elapsed_hours,
            remaining_hours,
            progress_percent: ratio * 100.0,
            is_complete: remaining_hours <= 0.0,
        }
    }
}

/// Where the user currently is in the fasting cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum FastingPhase {
    /// No fast in progress and no eating window open
    Idle,
    /// A fast is in progress
    #[serde(rename_all = "camelCase")]
    Fasting { session_id: SessionId },
    /// The latest fast ended less than `eating_window_hours` ago
    #[serde(rename_all = "camelCase")]
    EatingWindow {
        since: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
}

impl FastingPhase {
    /// Derive the phase from the session log without changing anything
    pub fn derive(
        sessions: &[FastingSession],
        settings: &FastingSettings,
        now: DateTime<Utc>,
    ) -> Self {
        if let Some(active) = sessions.iter().find(|s| s.is_in_progress()) {
            return FastingPhase::Fasting {
                session_id: active.id,
            };
        }

        match latest_completed(sessions).and_then(|s| s.end_time) {
            Some(end) if hours_between(end, now) < settings.eating_window_hours => {
                FastingPhase::EatingWindow {
                    since: end,
                    ends_at: end + hours(settings.eating_window_hours),
                }
            }
            _ => FastingPhase::Idle,
        }
    }
}

/// The completed session with the latest end time
pub fn latest_completed(sessions: &[FastingSession]) -> Option<&FastingSession> {
    sessions
        .iter()
        .filter(|s| s.completed)
        .max_by_key(|s| s.end_time.unwrap_or(s.start_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(hour as i64)
    }

    #[test]
    fn test_settings_validation() {
        assert!(FastingSettings::default().validate().is_ok());

        let mut settings = FastingSettings::default();
        settings.fasting_hours = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = FastingSettings::default();
        settings.eating_window_hours = f64::NAN;
        assert!(settings.validate().is_err());

        let mut settings = FastingSettings::default();
        settings.notification_time = "7pm".to_string();
        assert!(settings.validate().is_err());

        // Sums other than 24 are allowed
        let settings = FastingSettings {
            fasting_hours: 36.0,
            eating_window_hours: 12.0,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.cycle_hours(), 48.0);
    }

    #[test]
    fn test_finish_records_actual_duration() {
        let mut session = FastingSession::start(at(0), 16.0);
        assert_eq!(session.planned_end(), at(16));

        session.finish(at(17));
        assert!(session.completed);
        assert_eq!(session.end_time, Some(at(17)));
        assert!((session.duration - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_caps_at_hundred_percent() {
        let session = FastingSession::start(at(0), 16.0);

        let halfway = FastingProgress::calculate(&session, 16.0, at(8));
        assert!((halfway.progress_percent - 50.0).abs() < 1e-9);
        assert!((halfway.remaining_hours - 8.0).abs() < 1e-9);
        assert!(!halfway.is_complete);

        let over = FastingProgress::calculate(&session, 16.0, at(18));
        assert_eq!(over.progress_percent, 100.0);
        assert!((over.remaining_hours + 2.0).abs() < 1e-9);
        assert!(over.is_complete);
    }

    #[test]
    fn test_phase_derivation() {
        let settings = FastingSettings::default();
        assert_eq!(FastingPhase::derive(&[], &settings, at(0)), FastingPhase::Idle);

        let mut session = FastingSession::start(at(0), 16.0);
        let sessions = vec![session.clone()];
        assert_eq!(
            FastingPhase::derive(&sessions, &settings, at(3)),
            FastingPhase::Fasting { session_id: session.id }
        );

        session.finish(at(16));
        let sessions = vec![session];
        assert_eq!(
            FastingPhase::derive(&sessions, &settings, at(20)),
            FastingPhase::EatingWindow { since: at(16), ends_at: at(24) }
        );
        assert_eq!(FastingPhase::derive(&sessions, &settings, at(25)), FastingPhase::Idle);
    }

    #[test]
    fn test_latest_completed_uses_end_time() {
        let mut early = FastingSession::start(at(0), 16.0);
        early.finish(at(30));
        let mut late_start = FastingSession::start(at(2), 16.0);
        late_start.finish(at(10));

        let sessions = vec![late_start, early.clone()];
        assert_eq!(latest_completed(&sessions).map(|s| s.id), Some(early.id));
    }
}
