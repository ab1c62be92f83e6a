/// Habit lifecycle on the tracker
///
/// Creating, editing, archiving and deleting habits, recording day
/// statuses, and keeping the cached streak fields and milestone
/// notifications in step with the entry log.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{
    DayStatus, DomainError, EntryStatus, Habit, HabitId, HabitPatch, NewHabit, StreakSummary,
};
use crate::notify::{milestone_requests, Purpose, StreakNotificationSettings};
use crate::tracker::Tracker;

impl Tracker {
    /// Create a habit and schedule its milestone notifications
    ///
    /// Scheduling failures are logged; the habit is created regardless.
    pub fn create_habit(&mut self, new: NewHabit) -> Result<Habit, DomainError> {
        let habit = Habit::new(new)?;
        tracing::info!("Created habit '{}' ({})", habit.name, habit.id);

        self.habits.push(habit.clone());
        self.persist_habits();
        self.schedule_milestones(habit.id);

        Ok(habit)
    }

    pub fn habit(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Habits sorted by name, optionally only the active ones
    pub fn habits(&self, active_only: bool) -> Vec<&Habit> {
        let mut habits: Vec<&Habit> = self
            .habits
            .iter()
            .filter(|h| !active_only || h.is_active)
            .collect();
        habits.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        habits
    }

    /// Apply a partial update
    ///
    /// Returns `Ok(None)` for an unknown id. Milestones are rescheduled when
    /// anything they depend on changed: start date, notification opt-in,
    /// active flag, or the type/name used in their wording.
    pub fn update_habit(
        &mut self,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<Option<Habit>, DomainError> {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            return Ok(None);
        };

        let before = habit.clone();
        habit.update(patch)?;
        let updated = habit.clone();

        let reschedule = before.start_date != updated.start_date
            || before.notifications_enabled != updated.notifications_enabled
            || before.is_active != updated.is_active
            || before.habit_type != updated.habit_type
            || before.custom_name != updated.custom_name
            || before.name != updated.name;

        tracing::debug!("Updated habit {}", id);
        self.persist_habits();
        if reschedule {
            self.schedule_milestones(id);
        }

        Ok(Some(updated))
    }

    /// Soft delete: keep history, stop tracking and notifying
    pub fn deactivate_habit(&mut self, id: HabitId) -> bool {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        habit.is_active = false;

        tracing::info!("Deactivated habit {}", id);
        self.persist_habits();
        self.cancel_milestones(id);
        true
    }

    /// Hard delete: the habit, its entries and its notifications
    pub fn delete_habit(&mut self, id: HabitId) -> bool {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() == before {
            return false;
        }

        let removed = self.entries.delete_all_for_habit(id);
        let cancelled = self
            .notifications
            .cancel_entity(self.scheduler.as_ref(), &id.to_string());
        tracing::info!(
            "Deleted habit {} with {} entr(ies), cancelled {} notification(s)",
            id,
            removed,
            cancelled
        );

        self.persist_habits();
        self.persist_entries();
        self.persist_notifications();
        true
    }

    /// Record a day's status and refresh the habit's streak cache
    ///
    /// `DayStatus::None` clears the day. Unknown habits are ignored and
    /// yield `None`.
    pub fn set_habit_day_status(
        &mut self,
        id: HabitId,
        date: NaiveDate,
        status: DayStatus,
    ) -> Option<StreakSummary> {
        self.habit(id)?;

        self.entries.set_status(id, date, status);
        tracing::debug!("Set {} on {} to {:?}", id, date, status);
        self.persist_entries();

        self.update_habit_streaks(id)
    }

    /// Recompute the streak cache on a habit from its entries
    pub fn update_habit_streaks(&mut self, id: HabitId) -> Option<StreakSummary> {
        let summary = self.streak_summary(id)?;
        let habit = self.habits.iter_mut().find(|h| h.id == id)?;

        if habit.current_streak != summary.current_streak
            || habit.longest_streak != summary.longest_streak
            || habit.total_days != summary.total_days
        {
            habit.current_streak = summary.current_streak;
            habit.longest_streak = summary.longest_streak;
            habit.total_days = summary.total_days;
            self.persist_habits();
        }

        Some(summary)
    }

    /// Streak figures for a habit as of today
    pub fn streak_summary(&self, id: HabitId) -> Option<StreakSummary> {
        self.habit(id)?;
        let today = self.clock.today();
        Some(StreakSummary::calculate(
            id,
            self.entries.entries_for_habit(id),
            today,
        ))
    }

    pub fn current_streak(&self, id: HabitId) -> Option<u32> {
        self.streak_summary(id).map(|s| s.current_streak)
    }

    /// Recorded status for every day in `from..=to`; unrecorded days are
    /// absent from the map
    pub fn day_statuses(
        &self,
        id: HabitId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BTreeMap<NaiveDate, EntryStatus> {
        self.entries
            .entries_between(id, from, to)
            .into_iter()
            .map(|e| (e.date, e.status))
            .collect()
    }

    /// Mark today as a success for every active habit with no entry today
    ///
    /// Only today is touched; missed days are never backfilled. Running it
    /// twice in a day changes nothing the second time.
    pub fn auto_mark_today(&mut self) -> Vec<HabitId> {
        let today = self.clock.today();
        let targets: Vec<HabitId> = self
            .habits
            .iter()
            .filter(|h| h.is_active && !self.entries.has_entry(h.id, today))
            .map(|h| h.id)
            .collect();

        if targets.is_empty() {
            return targets;
        }

        for id in &targets {
            self.entries
                .set_status(*id, today, DayStatus::Set(EntryStatus::Success));
        }
        self.persist_entries();
        for id in &targets {
            self.update_habit_streaks(*id);
        }

        tracing::info!("Auto-marked {} habit(s) for {}", targets.len(), today);
        targets
    }

    pub fn streak_notification_settings(&self) -> &StreakNotificationSettings {
        &self.streak_notifications
    }

    /// Replace the milestone settings and reschedule every active habit
    pub fn update_streak_notification_settings(
        &mut self,
        settings: StreakNotificationSettings,
    ) -> Result<(), DomainError> {
        settings.validate()?;
        self.streak_notifications = settings;
        self.persist_streak_notifications();

        let ids: Vec<HabitId> = self.habits.iter().map(|h| h.id).collect();
        for id in ids {
            self.schedule_milestones(id);
        }
        Ok(())
    }

    /// Cancel then schedule the milestones a habit should have pending
    fn schedule_milestones(&mut self, id: HabitId) {
        let Some(habit) = self.habits.iter().find(|h| h.id == id) else {
            return;
        };
        let requests = milestone_requests(habit, &self.streak_notifications, self.clock.as_ref());

        let scheduled = self.notifications.replace(
            self.scheduler.as_ref(),
            Purpose::Milestone,
            &id.to_string(),
            &requests,
        );
        tracing::debug!(
            "Scheduled {} of {} milestone notification(s) for {}",
            scheduled,
            requests.len(),
            id
        );
        self.persist_notifications();
    }

    fn cancel_milestones(&mut self, id: HabitId) {
        self.notifications
            .cancel(self.scheduler.as_ref(), Purpose::Milestone, &id.to_string());
        self.persist_notifications();
    }
}
