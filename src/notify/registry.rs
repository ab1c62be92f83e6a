//! Side table from (purpose, entity) to scheduled notification ids.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notify::{NotificationId, NotificationScheduler, ScheduleRequest};

/// Why a notification was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Habit day-count milestones
    Milestone,
    /// A fast reaching its planned length
    FastingEnd,
    /// The eating window after a fast closing
    EatingWindowEnd,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Milestone => "milestone",
            Purpose::FastingEnd => "fastingEnd",
            Purpose::EatingWindowEnd => "eatingWindowEnd",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification ids keyed by `"<purpose>:<entityId>"`
///
/// Serialized as a flat JSON object so it fits one key-value slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationRegistry {
    entries: BTreeMap<String, Vec<NotificationId>>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(purpose: Purpose, entity_id: &str) -> String {
        format!("{}:{}", purpose, entity_id)
    }

    /// Ids currently recorded for (purpose, entity)
    pub fn ids(&self, purpose: Purpose, entity_id: &str) -> &[NotificationId] {
        self.entries
            .get(&Self::key(purpose, entity_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancel and forget everything recorded for (purpose, entity)
    ///
    /// Backend failures are logged; the ids are forgotten regardless, since
    /// a notification the backend no longer knows about cannot be retried.
    pub fn cancel(
        &mut self,
        scheduler: &dyn NotificationScheduler,
        purpose: Purpose,
        entity_id: &str,
    ) -> usize {
        let ids = self
            .entries
            .remove(&Self::key(purpose, entity_id))
            .unwrap_or_default();
        cancel_ids(scheduler, &ids);
        ids.len()
    }

    /// Cancel and forget everything recorded for an entity, any purpose
    pub fn cancel_entity(&mut self, scheduler: &dyn NotificationScheduler, entity_id: &str) -> usize {
        let suffix = format!(":{}", entity_id);
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|k| k.ends_with(&suffix))
            .cloned()
            .collect();

        let mut cancelled = 0;
        for key in keys {
            if let Some(ids) = self.entries.remove(&key) {
                cancel_ids(scheduler, &ids);
                cancelled += ids.len();
            }
        }
        cancelled
    }

    /// Replace whatever is recorded for (purpose, entity) with `requests`
    ///
    /// Existing notifications are cancelled first, so calling this twice
    /// with the same requests leaves exactly one set pending. Requests the
    /// backend rejects are logged and skipped. Returns how many were
    /// scheduled.
    pub fn replace(
        &mut self,
        scheduler: &dyn NotificationScheduler,
        purpose: Purpose,
        entity_id: &str,
        requests: &[ScheduleRequest],
    ) -> usize {
        self.cancel(scheduler, purpose, entity_id);

        let mut scheduled = Vec::with_capacity(requests.len());
        for request in requests {
            match scheduler.schedule(&request.content, &request.trigger) {
                Ok(id) => scheduled.push(id),
                Err(e) => tracing::warn!(
                    "Failed to schedule {} notification for {}: {}",
                    purpose,
                    entity_id,
                    e
                ),
            }
        }

        let count = scheduled.len();
        if !scheduled.is_empty() {
            self.entries.insert(Self::key(purpose, entity_id), scheduled);
        }
        count
    }
}

fn cancel_ids(scheduler: &dyn NotificationScheduler, ids: &[NotificationId]) {
    for id in ids {
        if let Err(e) = scheduler.cancel(id) {
            tracing::warn!("Failed to cancel notification {}: {}", id, e);
        }
    }
}
