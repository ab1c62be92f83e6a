/// HabitEntry entity for tracking a habit's status on a given day
///
/// This module defines the HabitEntry struct: one record per habit per
/// calendar day, holding whether that day was a success, failure or skip.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{EntryId, EntryStatus, HabitId};

/// A habit's recorded status for one calendar day
///
/// At most one entry exists for any (habit_id, date) pair; the entry store
/// enforces this by replacing the status instead of inserting a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Which habit this entry is for
    pub habit_id: HabitId,
    /// Calendar day this status applies to
    pub date: NaiveDate,
    /// What happened that day
    pub status: EntryStatus,
}

impl HabitEntry {
    /// Create a new entry with a fresh id
    pub fn new(habit_id: HabitId, date: NaiveDate, status: EntryStatus) -> Self {
        Self {
            id: EntryId::new(),
            habit_id,
            date,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EntryStatus::Success
    }

    pub fn is_skip(&self) -> bool {
        self.status == EntryStatus::Skip
    }
}
