/// MCP tools for habit and fasting management
///
/// Each tool takes a typed parameter struct (deserialized from the call's
/// arguments, with a JSON schema derived for `tools/list`) and returns a
/// response carrying a human-readable message.

pub mod fasting;
pub mod habits;
pub mod resume;

pub use fasting::*;
pub use habits::*;
pub use resume::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::dates::parse_day_key;
use crate::domain::{DomainError, HabitId, SessionId};

/// Errors a tool call can fail with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("Fasting session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid ID format: '{0}'")]
    InvalidId(String),
}

pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    let raw = raw.trim();
    HabitId::from_string(raw).map_err(|_| ToolError::InvalidId(raw.to_string()))
}

pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, ToolError> {
    let raw = raw.trim();
    SessionId::from_string(raw).map_err(|_| ToolError::InvalidId(raw.to_string()))
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to `today`
pub(crate) fn parse_date_or(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ToolError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Ok(parse_day_key(raw)?),
        _ => Ok(today),
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
