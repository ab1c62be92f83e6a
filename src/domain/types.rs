/// Core types and enums used throughout the domain layer
///
/// This module defines the ID newtypes and the small enums (habit type,
/// entry status) shared by habits, entries and fasting sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where an entry ID is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for tool arguments)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a habit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Generate a new random entry ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a fasting session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a session ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What the user is cutting back on
///
/// The type drives the wording of milestone notifications. `Custom` habits
/// carry their own display name on the habit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    Alcohol,
    Caffeine,
    Sugar,
    Custom,
}

impl HabitType {
    /// Get the display name for this habit type
    pub fn display_name(&self) -> &'static str {
        match self {
            HabitType::Alcohol => "Alcohol",
            HabitType::Caffeine => "Caffeine",
            HabitType::Sugar => "Sugar",
            HabitType::Custom => "Custom",
        }
    }

    /// Parse a habit type from user input (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "alcohol" => Ok(HabitType::Alcohol),
            "caffeine" => Ok(HabitType::Caffeine),
            "sugar" => Ok(HabitType::Sugar),
            "custom" => Ok(HabitType::Custom),
            other => Err(DomainError::Validation {
                message: format!(
                    "Invalid habit type '{}'. Valid options: alcohol, caffeine, sugar, custom",
                    other
                ),
            }),
        }
    }
}

/// Status recorded for a habit on a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// The user kept the habit that day
    Success,
    /// The user slipped that day
    Failure,
    /// A deliberate pause; neither extends nor breaks a streak
    Skip,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Success => "success",
            EntryStatus::Failure => "failure",
            EntryStatus::Skip => "skip",
        }
    }
}

/// Requested status for a day, including the "clear" sentinel
///
/// Writing `DayStatus::None` deletes whatever entry exists for that day
/// instead of storing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Set(EntryStatus),
    None,
}

impl DayStatus {
    /// Parse from user input: success, failure, skip or none
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(DayStatus::Set(EntryStatus::Success)),
            "failure" => Ok(DayStatus::Set(EntryStatus::Failure)),
            "skip" => Ok(DayStatus::Set(EntryStatus::Skip)),
            "none" | "clear" => Ok(DayStatus::None),
            other => Err(DomainError::Validation {
                message: format!(
                    "Invalid status '{}'. Valid options: success, failure, skip, none",
                    other
                ),
            }),
        }
    }
}

impl From<EntryStatus> for DayStatus {
    fn from(status: EntryStatus) -> Self {
        DayStatus::Set(status)
    }
}
