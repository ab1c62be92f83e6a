//! Per-habit daily status log.
//!
//! Holds at most one entry per (habit, day). Returned lists carry no
//! ordering guarantee; callers sort when they need to.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DayStatus, HabitEntry, HabitId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryStore {
    entries: Vec<HabitEntry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted entries, collapsing duplicate days
    ///
    /// If the same (habit, day) appears more than once, the entry written
    /// last wins. Returns the store and how many duplicates were dropped.
    pub fn from_entries(entries: Vec<HabitEntry>) -> (Self, usize) {
        let total = entries.len();
        let mut last_index: HashMap<(HabitId, NaiveDate), usize> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            last_index.insert((entry.habit_id, entry.date), index);
        }

        let kept: Vec<HabitEntry> = entries
            .into_iter()
            .enumerate()
            .filter(|(index, entry)| last_index.get(&(entry.habit_id, entry.date)) == Some(index))
            .map(|(_, entry)| entry)
            .collect();

        let dropped = total - kept.len();
        (Self { entries: kept }, dropped)
    }

    /// Record `status` for (habit, day)
    ///
    /// `DayStatus::None` removes the day's entry. Any other status replaces
    /// the existing entry's status in place, or inserts a new entry when the
    /// day had none. Returns the entry now stored for that day.
    pub fn set_status(
        &mut self,
        habit_id: HabitId,
        date: NaiveDate,
        status: DayStatus,
    ) -> Option<&HabitEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.habit_id == habit_id && e.date == date);

        match (status, position) {
            (DayStatus::None, Some(index)) => {
                self.entries.remove(index);
                None
            }
            (DayStatus::None, None) => None,
            (DayStatus::Set(status), Some(index)) => {
                self.entries[index].status = status;
                self.entries.get(index)
            }
            (DayStatus::Set(status), None) => {
                self.entries.push(HabitEntry::new(habit_id, date, status));
                self.entries.last()
            }
        }
    }

    /// Entries for (habit, day); at most one element
    pub fn entries_for(&self, habit_id: HabitId, date: NaiveDate) -> Vec<&HabitEntry> {
        self.entries
            .iter()
            .filter(|e| e.habit_id == habit_id && e.date == date)
            .collect()
    }

    pub fn has_entry(&self, habit_id: HabitId, date: NaiveDate) -> bool {
        self.entries
            .iter()
            .any(|e| e.habit_id == habit_id && e.date == date)
    }

    /// All entries for a habit, any day
    pub fn entries_for_habit(&self, habit_id: HabitId) -> Vec<&HabitEntry> {
        self.entries
            .iter()
            .filter(|e| e.habit_id == habit_id)
            .collect()
    }

    /// Entries for a habit within `from..=to`
    pub fn entries_between(
        &self,
        habit_id: HabitId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<&HabitEntry> {
        self.entries
            .iter()
            .filter(|e| e.habit_id == habit_id && e.date >= from && e.date <= to)
            .collect()
    }

    /// Cascade delete for a habit; returns how many entries went
    pub fn delete_all_for_habit(&mut self, habit_id: HabitId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.habit_id != habit_id);
        before - self.entries.len()
    }

    /// Drop entries whose habit is not in `habit_ids`
    pub fn retain_habits(&mut self, habit_ids: &HashSet<HabitId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| habit_ids.contains(&e.habit_id));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
