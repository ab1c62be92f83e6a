/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something the
/// user is tracking day by day, along with validation and partial updates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::days_between;
use crate::domain::{DomainError, HabitId, HabitType};

pub const DEFAULT_COLOR: &str = "#4CAF50";

fn default_true() -> bool {
    true
}

/// A habit the user is tracking
///
/// The streak fields are a cache derived from the habit's entries. They are
/// rewritten after every entry mutation and are never the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "No beer on weekdays")
    pub name: String,
    /// What kind of habit this is; drives milestone wording
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    /// Name used for `HabitType::Custom` habits
    #[serde(default)]
    pub custom_name: Option<String>,
    /// Day tracking started; milestone notifications count from here
    pub start_date: NaiveDate,
    /// Whether this habit is currently tracked (soft delete sets this false)
    pub is_active: bool,
    /// Display color, opaque to the core
    #[serde(default)]
    pub color: String,
    /// Whether milestone notifications should be scheduled for this habit
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub total_days: u32,
}

/// Input for creating a habit
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub habit_type: HabitType,
    pub custom_name: Option<String>,
    pub start_date: NaiveDate,
    pub color: Option<String>,
    pub notifications_enabled: bool,
}

impl NewHabit {
    pub fn new(name: impl Into<String>, habit_type: HabitType, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            habit_type,
            custom_name: None,
            start_date,
            color: None,
            notifications_enabled: true,
        }
    }
}

/// Partial update for a habit; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub habit_type: Option<HabitType>,
    pub custom_name: Option<Option<String>>,
    pub start_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub color: Option<String>,
    pub notifications_enabled: Option<bool>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// The id is freshly assigned and the streak caches start at zero.
    pub fn new(new: NewHabit) -> Result<Self, DomainError> {
        let name = new.name.trim().to_string();
        Self::validate_name(&name)?;
        let custom_name = Self::normalize_custom_name(new.custom_name)?;
        let color = match new.color {
            Some(color) => {
                Self::validate_color(&color)?;
                color
            }
            None => DEFAULT_COLOR.to_string(),
        };

        Ok(Self {
            id: HabitId::new(),
            name,
            habit_type: new.habit_type,
            custom_name,
            start_date: new.start_date,
            is_active: true,
            color,
            notifications_enabled: new.notifications_enabled,
            current_streak: 0,
            longest_streak: 0,
            total_days: 0,
        })
    }

    /// Apply a partial update with validation
    ///
    /// All fields are validated before any is applied, so a rejected patch
    /// leaves the habit unchanged.
    pub fn update(&mut self, patch: HabitPatch) -> Result<(), DomainError> {
        let name = match patch.name {
            Some(name) => {
                let trimmed = name.trim().to_string();
                Self::validate_name(&trimmed)?;
                Some(trimmed)
            }
            None => None,
        };
        let custom_name = match patch.custom_name {
            Some(custom) => Some(Self::normalize_custom_name(custom)?),
            None => None,
        };
        if let Some(ref color) = patch.color {
            Self::validate_color(color)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(habit_type) = patch.habit_type {
            self.habit_type = habit_type;
        }
        if let Some(custom_name) = custom_name {
            self.custom_name = custom_name;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(enabled) = patch.notifications_enabled {
            self.notifications_enabled = enabled;
        }

        Ok(())
    }

    /// What the habit is about, for user-facing messages
    ///
    /// Custom habits use their custom name (falling back to the habit name);
    /// the built-in types use the type's name.
    pub fn subject(&self) -> String {
        match self.habit_type {
            HabitType::Custom => self
                .custom_name
                .clone()
                .unwrap_or_else(|| self.name.clone()),
            other => other.display_name().to_lowercase(),
        }
    }

    /// Days since tracking started, counting the start day as day 1
    pub fn days_tracked(&self, today: NaiveDate) -> i64 {
        days_between(self.start_date, today) + 1
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if name.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Blank custom names are stored as absent
    fn normalize_custom_name(custom: Option<String>) -> Result<Option<String>, DomainError> {
        match custom.map(|c| c.trim().to_string()) {
            Some(c) if c.is_empty() => Ok(None),
            Some(c) if c.chars().count() > 50 => Err(DomainError::Validation {
                message: "Custom name cannot be longer than 50 characters".to_string(),
            }),
            other => Ok(other),
        }
    }

    fn validate_color(color: &str) -> Result<(), DomainError> {
        if color.trim().is_empty() || color.len() > 32 {
            return Err(DomainError::InvalidValue {
                message: format!("Invalid color '{}'", color),
            });
        }
        Ok(())
    }
}
