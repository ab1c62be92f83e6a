/// Fasting session, progress and phase calculations
use chrono::{DateTime, Duration, TimeZone, Utc};
use habit_fasting_tracker::*;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, hour, 0, 0).unwrap()
}

fn completed(start: DateTime<Utc>, hours: i64) -> FastingSession {
    let mut session = FastingSession::start(start, 16.0);
    session.finish(start + Duration::hours(hours));
    session
}

#[cfg(test)]
mod fasting_cycle_tests {
    use super::*;

    #[test]
    fn test_session_duration_switches_from_planned_to_actual() {
        let mut session = FastingSession::start(at(20), 16.0);
        assert_eq!(session.duration, 16.0);
        assert!(session.is_in_progress());
        assert_eq!(session.planned_end(), at(20) + Duration::hours(16));

        session.finish(at(20) + Duration::minutes(17 * 60 + 30));
        assert!(!session.is_in_progress());
        assert!((session.duration - 17.5).abs() < 1e-9);
        // Elapsed stops at the end time
        assert!((session.elapsed_hours(at(23) + Duration::days(3)) - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_progress_is_clamped_but_remaining_goes_negative() {
        let session = FastingSession::start(at(0), 16.0);

        let early = FastingProgress::calculate(&session, 16.0, at(4));
        assert!((early.progress_percent - 25.0).abs() < 1e-9);
        assert!((early.remaining_hours - 12.0).abs() < 1e-9);
        assert!(!early.is_complete);

        let exact = FastingProgress::calculate(&session, 16.0, at(16));
        assert!(exact.is_complete);
        assert_eq!(exact.progress_percent, 100.0);

        let late = FastingProgress::calculate(&session, 16.0, at(20));
        assert_eq!(late.progress_percent, 100.0);
        assert!((late.remaining_hours + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_uses_current_target() {
        // Session planned at 16h, target since changed to 20h
        let session = FastingSession::start(at(0), 16.0);
        let progress = FastingProgress::calculate(&session, 20.0, at(10));
        assert!((progress.progress_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_derivation() {
        let settings = FastingSettings::default();
        assert_eq!(FastingPhase::derive(&[], &settings, at(12)), FastingPhase::Idle);

        let open = FastingSession::start(at(0), 16.0);
        assert_eq!(
            FastingPhase::derive(&[open.clone()], &settings, at(12)),
            FastingPhase::Fasting { session_id: open.id }
        );

        // Ended at 16:00 with an 8h window
        let done = completed(at(0), 16);
        match FastingPhase::derive(&[done.clone()], &settings, at(23)) {
            FastingPhase::EatingWindow { since, ends_at } => {
                assert_eq!(since, at(16));
                assert_eq!(ends_at, at(16) + Duration::hours(8));
            }
            other => panic!("expected eating window, got {:?}", other),
        }

        // Exactly at the end of the window the phase is idle
        let window_end = at(16) + Duration::hours(8);
        assert_eq!(
            FastingPhase::derive(&[done], &settings, window_end),
            FastingPhase::Idle
        );
    }

    #[test]
    fn test_latest_completed_ignores_open_and_order() {
        let older = completed(at(0), 2);
        let newer = completed(at(5), 3);
        let open = FastingSession::start(at(10), 16.0);

        let sessions = vec![newer.clone(), open, older];
        assert_eq!(latest_completed(&sessions).map(|s| s.id), Some(newer.id));
        assert!(latest_completed(&[FastingSession::start(at(1), 16.0)]).is_none());
    }

    #[test]
    fn test_settings_validation_bounds() {
        let valid = |fasting: f64, eating: f64| {
            FastingSettings {
                fasting_hours: fasting,
                eating_window_hours: eating,
                ..Default::default()
            }
            .validate()
            .is_ok()
        };

        assert!(valid(16.0, 8.0));
        // Cycles need not add up to a day
        assert!(valid(20.0, 8.0));
        assert!(valid(36.0, 12.0));
        assert!(valid(MAX_PHASE_HOURS, 0.5));

        assert!(!valid(0.0, 8.0));
        assert!(!valid(16.0, -1.0));
        assert!(!valid(MAX_PHASE_HOURS + 0.5, 8.0));
        assert!(!valid(f64::NAN, 8.0));

        let bad_time = FastingSettings {
            start_time: "8pm".to_string(),
            ..Default::default()
        };
        assert!(bad_time.validate().is_err());
    }

    #[test]
    fn test_settings_defaults_and_wire_format() {
        let settings = FastingSettings::default();
        assert_eq!(settings.fasting_hours, 16.0);
        assert_eq!(settings.eating_window_hours, 8.0);
        assert_eq!(settings.cycle_hours(), 24.0);
        assert!(!settings.is_active);

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["fastingHours"], 16.0);
        assert_eq!(json["eatingWindowHours"], 8.0);
        assert_eq!(json["isActive"], false);

        // Missing fields fall back to defaults
        let partial: FastingSettings =
            serde_json::from_str(r#"{"fastingHours": 18, "isActive": true}"#).unwrap();
        assert_eq!(partial.fasting_hours, 18.0);
        assert_eq!(partial.eating_window_hours, 8.0);
        assert!(partial.is_active);
        assert!(partial.notifications);
    }

    #[test]
    fn test_session_wire_format() {
        let open = FastingSession::start(at(20), 16.0);
        let json = serde_json::to_value(&open).unwrap();
        assert!(json["startTime"].is_string());
        assert!(json["endTime"].is_null());
        assert_eq!(json["completed"], false);

        let restored: FastingSession = serde_json::from_value(json).unwrap();
        assert_eq!(restored, open);
    }
}
