//! Fasting cycle state machine on the tracker.
//!
//! There is no background timer. The cycle advances only when the tracker
//! is asked about it: `reconcile_and_get_current_session` looks at the
//! session log and the clock and starts the next fast if auto-cycling is
//! on and the eating window has run out.

use crate::domain::dates::hours_between;
use crate::domain::{
    latest_completed, DomainError, FastingPhase, FastingProgress, FastingSession, FastingSettings,
    SessionId,
};
use crate::notify::{eating_window_end_request, fasting_end_request, Purpose};
use crate::tracker::Tracker;

impl Tracker {
    pub fn fasting_settings(&self) -> &FastingSettings {
        &self.fasting_settings
    }

    /// Replace the fasting schedule
    ///
    /// Reminders for the current fast and the open eating window are
    /// rescheduled against the new settings (or cancelled if reminders were
    /// switched off).
    pub fn update_fasting_settings(&mut self, settings: FastingSettings) -> Result<(), DomainError> {
        settings.validate()?;
        self.fasting_settings = settings;
        self.persist_fasting_settings();
        tracing::info!(
            "Fasting schedule set to {}h fast / {}h eating window (auto-cycle: {})",
            self.fasting_settings.fasting_hours,
            self.fasting_settings.eating_window_hours,
            self.fasting_settings.is_active
        );

        if let Some(active) = self.peek_current_session().cloned() {
            self.schedule_fasting_end(&active);
        }
        if let Some(last) = latest_completed(&self.fasting_sessions).cloned() {
            self.schedule_eating_window_end(&last);
        }
        self.persist_notifications();
        Ok(())
    }

    /// Start a fast now
    ///
    /// If a fast is already in progress it is returned unchanged; there is
    /// never more than one open session.
    pub fn start_fasting_session(&mut self) -> FastingSession {
        if let Some(active) = self.peek_current_session() {
            tracing::debug!("Fast {} already in progress", active.id);
            return active.clone();
        }

        let now = self.clock.now();
        let session = FastingSession::start(now, self.fasting_settings.fasting_hours);
        tracing::info!("Started fast {} at {}", session.id, now);

        if let Some(last) = latest_completed(&self.fasting_sessions) {
            let entity = last.id.to_string();
            self.notifications
                .cancel(self.scheduler.as_ref(), Purpose::EatingWindowEnd, &entity);
        }

        self.fasting_sessions.push(session.clone());
        self.persist_sessions();
        self.schedule_fasting_end(&session);
        self.persist_notifications();

        session
    }

    /// End the fast in progress, recording its real length
    ///
    /// Returns `None` when no fast is in progress.
    pub fn end_fasting_session(&mut self) -> Option<FastingSession> {
        let now = self.clock.now();
        let session = self.fasting_sessions.iter_mut().find(|s| s.is_in_progress())?;
        session.finish(now);
        let ended = session.clone();
        tracing::info!("Ended fast {} after {:.2}h", ended.id, ended.duration);

        self.persist_sessions();
        self.notifications.cancel(
            self.scheduler.as_ref(),
            Purpose::FastingEnd,
            &ended.id.to_string(),
        );
        self.schedule_eating_window_end(&ended);
        self.persist_notifications();

        Some(ended)
    }

    /// The fast in progress, advancing the cycle first if it is due
    ///
    /// With auto-cycling on, a new fast starts when there has never been
    /// one, or when more than `eating_window_hours` have passed since the
    /// latest fast ended. The new fast starts at the current time.
    pub fn reconcile_and_get_current_session(&mut self) -> Option<FastingSession> {
        if let Some(active) = self.peek_current_session() {
            return Some(active.clone());
        }
        if !self.fasting_settings.is_active {
            return None;
        }

        let now = self.clock.now();
        let due = match latest_completed(&self.fasting_sessions) {
            None => true,
            Some(last) => {
                let ended = last.end_time.unwrap_or(last.start_time);
                hours_between(ended, now) > self.fasting_settings.eating_window_hours
            }
        };

        due.then(|| self.start_fasting_session())
    }

    /// The fast in progress, without side effects
    pub fn peek_current_session(&self) -> Option<&FastingSession> {
        self.fasting_sessions.iter().find(|s| s.is_in_progress())
    }

    pub fn fasting_phase(&self) -> FastingPhase {
        FastingPhase::derive(&self.fasting_sessions, &self.fasting_settings, self.clock.now())
    }

    /// Progress of `session` against the configured fasting length
    pub fn fasting_progress(&self, session: &FastingSession) -> FastingProgress {
        FastingProgress::calculate(
            session,
            self.fasting_settings.fasting_hours,
            self.clock.now(),
        )
    }

    /// Sessions newest first, optionally capped at `limit`
    pub fn fasting_history(&self, limit: Option<usize>) -> Vec<&FastingSession> {
        let mut sessions: Vec<&FastingSession> = self.fasting_sessions.iter().collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        if let Some(limit) = limit {
            sessions.truncate(limit);
        }
        sessions
    }

    /// Remove a session from the log along with its reminders
    pub fn delete_fasting_session(&mut self, id: SessionId) -> bool {
        let before = self.fasting_sessions.len();
        self.fasting_sessions.retain(|s| s.id != id);
        if self.fasting_sessions.len() == before {
            return false;
        }

        self.notifications
            .cancel_entity(self.scheduler.as_ref(), &id.to_string());
        tracing::info!("Deleted fasting session {}", id);
        self.persist_sessions();
        self.persist_notifications();
        true
    }

    fn schedule_fasting_end(&mut self, session: &FastingSession) {
        let requests: Vec<_> =
            fasting_end_request(session, &self.fasting_settings, self.clock.now())
                .into_iter()
                .collect();
        self.notifications.replace(
            self.scheduler.as_ref(),
            Purpose::FastingEnd,
            &session.id.to_string(),
            &requests,
        );
    }

    fn schedule_eating_window_end(&mut self, session: &FastingSession) {
        let requests: Vec<_> =
            eating_window_end_request(session, &self.fasting_settings, self.clock.now())
                .into_iter()
                .collect();
        self.notifications.replace(
            self.scheduler.as_ref(),
            Purpose::EatingWindowEnd,
            &session.id.to_string(),
            &requests,
        );
    }
}
