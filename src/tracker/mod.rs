/// The tracker service
///
/// `Tracker` owns all in-memory state (habits, entries, fasting sessions,
/// settings and scheduled notification ids) and is the only thing that
/// mutates it. Collaborators are injected: a key-value store for
/// persistence, a notification scheduler and a clock.
///
/// Every mutation updates memory first and then writes the affected
/// collection back to the store. Write failures are logged and never
/// undo the in-memory change.

pub mod entry_store;
mod fasting;
mod habits;

pub use entry_store::EntryStore;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::clock::Clock;
use crate::domain::{FastingSession, FastingSettings, Habit, HabitEntry, HabitId};
use crate::notify::{NotificationRegistry, NotificationScheduler, StreakNotificationSettings};
use crate::storage::{keys, load_or, load_or_default, save_json, try_load, KeyValueStore};

/// Fallback values used when the store has nothing saved yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerDefaults {
    pub fasting: FastingSettings,
    pub streak_notifications: StreakNotificationSettings,
}

/// What happened when the app came back to the foreground
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeReport {
    /// Habits that got an automatic success for today
    pub auto_marked: Vec<HabitId>,
    /// The fast in progress after reconciliation, if any
    pub current_session: Option<FastingSession>,
    /// Whether reconciliation started a new fast
    pub started_fast: bool,
}

pub struct Tracker {
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    clock: Arc<dyn Clock>,
    habits: Vec<Habit>,
    entries: EntryStore,
    fasting_settings: FastingSettings,
    fasting_sessions: Vec<FastingSession>,
    streak_notifications: StreakNotificationSettings,
    notifications: NotificationRegistry,
}

impl Tracker {
    /// Load a tracker from `store` with built-in defaults
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn NotificationScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::open_with_defaults(store, scheduler, clock, TrackerDefaults::default())
    }

    /// Load a tracker from `store`, using `defaults` for settings that were
    /// never saved
    ///
    /// Malformed collections load as empty. Entries whose habit no longer
    /// exists are pruned (unless the habit list itself could not be read), duplicate day entries are collapsed and, if more
    /// than one fast was left open, all but the latest are closed at their
    /// planned end.
    pub fn open_with_defaults(
        store: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn NotificationScheduler>,
        clock: Arc<dyn Clock>,
        defaults: TrackerDefaults,
    ) -> Self {
        let loaded_habits = try_load::<Vec<Habit>>(store.as_ref(), keys::HABITS);
        let (habits, habits_readable) = match loaded_habits {
            Ok(habits) => (habits.unwrap_or_default(), true),
            Err(e) => {
                tracing::warn!("Could not load habits, keeping entries untouched: {}", e);
                (Vec::new(), false)
            }
        };
        let raw_entries: Vec<HabitEntry> = load_or_default(store.as_ref(), keys::HABIT_ENTRIES);
        let fasting_settings = load_or(store.as_ref(), keys::FASTING_SETTINGS, defaults.fasting);
        let fasting_sessions: Vec<FastingSession> =
            load_or_default(store.as_ref(), keys::FASTING_SESSIONS);
        let streak_notifications = load_or(
            store.as_ref(),
            keys::STREAK_NOTIFICATION_SETTINGS,
            defaults.streak_notifications,
        );
        let notifications: NotificationRegistry =
            load_or_default(store.as_ref(), keys::NOTIFICATION_IDS);

        let (mut entries, duplicates) = EntryStore::from_entries(raw_entries);
        // Without a readable habit list every entry would look orphaned
        let orphans = if habits_readable {
            let habit_ids: HashSet<HabitId> = habits.iter().map(|h| h.id).collect();
            entries.retain_habits(&habit_ids)
        } else {
            0
        };

        let mut tracker = Self {
            store,
            scheduler,
            clock,
            habits,
            entries,
            fasting_settings,
            fasting_sessions,
            streak_notifications,
            notifications,
        };

        if duplicates > 0 || orphans > 0 {
            tracing::warn!(
                "Cleaned habit entries on load: {} duplicate(s), {} orphan(s)",
                duplicates,
                orphans
            );
            tracker.persist_entries();
        }
        if tracker.close_extra_open_sessions() > 0 {
            tracker.persist_sessions();
        }

        tracing::info!(
            "Tracker loaded: {} habit(s), {} entr(ies), {} fasting session(s)",
            tracker.habits.len(),
            tracker.entries.len(),
            tracker.fasting_sessions.len()
        );

        tracker
    }

    /// Bring derived state up to date after the app resumes
    ///
    /// Marks today as a success for active habits that have no entry yet,
    /// then reconciles the fasting cycle.
    pub fn on_resume(&mut self) -> ResumeReport {
        let auto_marked = self.auto_mark_today();
        let sessions_before = self.fasting_sessions.len();
        let current_session = self.reconcile_and_get_current_session();

        ResumeReport {
            auto_marked,
            current_session,
            started_fast: self.fasting_sessions.len() > sessions_before,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Read-only view of the entry log
    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    /// Notification ids currently recorded, by purpose and entity
    pub fn notification_registry(&self) -> &NotificationRegistry {
        &self.notifications
    }

    fn close_extra_open_sessions(&mut self) -> usize {
        let latest_open = self
            .fasting_sessions
            .iter()
            .filter(|s| s.is_in_progress())
            .max_by_key(|s| s.start_time)
            .map(|s| s.id);

        let mut closed = 0;
        for session in self.fasting_sessions.iter_mut() {
            if session.is_in_progress() && Some(session.id) != latest_open {
                let end = session.planned_end();
                session.finish(end);
                closed += 1;
            }
        }
        if closed > 0 {
            tracing::warn!("Closed {} stale open fasting session(s) on load", closed);
        }
        closed
    }

    // Write-behind persistence, one collection per key

    fn persist_habits(&self) {
        save_json(self.store.as_ref(), keys::HABITS, &self.habits);
    }

    fn persist_entries(&self) {
        save_json(self.store.as_ref(), keys::HABIT_ENTRIES, &self.entries);
    }

    fn persist_fasting_settings(&self) {
        save_json(self.store.as_ref(), keys::FASTING_SETTINGS, &self.fasting_settings);
    }

    fn persist_sessions(&self) {
        save_json(self.store.as_ref(), keys::FASTING_SESSIONS, &self.fasting_sessions);
    }

    fn persist_streak_notifications(&self) {
        save_json(
            self.store.as_ref(),
            keys::STREAK_NOTIFICATION_SETTINGS,
            &self.streak_notifications,
        );
    }

    fn persist_notifications(&self) {
        save_json(self.store.as_ref(), keys::NOTIFICATION_IDS, &self.notifications);
    }
}
