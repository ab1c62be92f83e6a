/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitEntry, FastingSession)
/// and the pure calculations over them (streaks, fasting progress). Nothing
/// in here touches storage, notifications or the wall clock.

pub mod dates;
pub mod entry;
pub mod fasting;
pub mod habit;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use entry::*;
pub use fasting::*;
pub use habit::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
