/// Notification scheduling capability
///
/// The tracker never delivers notifications itself. It asks a
/// `NotificationScheduler` to schedule or cancel them and keeps the returned
/// ids in a `NotificationRegistry` so they can be replaced or bulk-cancelled
/// when the data they were derived from changes.

pub mod fasting;
pub mod milestones;
pub mod registry;

pub use fasting::*;
pub use milestones::*;
pub use registry::*;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors a scheduler backend can report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Notification backend unavailable: {0}")]
    Unavailable(String),

    #[error("Notification trigger is in the past")]
    TriggerInPast,

    #[error("Unknown notification id: {0}")]
    UnknownId(String),
}

/// Opaque id handed out by a scheduler backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the user sees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// When a notification should fire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// At an absolute instant
    At(DateTime<Utc>),
    /// After a delay from the moment of scheduling
    After(Duration),
}

/// A content/trigger pair waiting to be handed to a scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub content: NotificationContent,
    pub trigger: Trigger,
}

/// Backend that delivers time-based local notifications
pub trait NotificationScheduler {
    /// Schedule a notification, returning an id usable with `cancel`
    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> Result<NotificationId, NotifyError>;

    /// Cancel a previously scheduled notification
    fn cancel(&self, id: &NotificationId) -> Result<(), NotifyError>;
}

/// Scheduler that accepts everything and delivers nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl NotificationScheduler for NoopScheduler {
    fn schedule(
        &self,
        _content: &NotificationContent,
        _trigger: &Trigger,
    ) -> Result<NotificationId, NotifyError> {
        Ok(NotificationId::generate())
    }

    fn cancel(&self, _id: &NotificationId) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Scheduler that only writes what it would deliver to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScheduler;

impl NotificationScheduler for LogScheduler {
    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> Result<NotificationId, NotifyError> {
        let id = NotificationId::generate();
        tracing::info!(
            notification_id = %id,
            trigger = ?trigger,
            "Scheduled notification: {} - {}",
            content.title,
            content.body
        );
        Ok(id)
    }

    fn cancel(&self, id: &NotificationId) -> Result<(), NotifyError> {
        tracing::info!(notification_id = %id, "Cancelled notification");
        Ok(())
    }
}

/// A notification held by `RecordingScheduler`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNotification {
    pub id: NotificationId,
    pub content: NotificationContent,
    pub trigger: Trigger,
}

/// In-memory scheduler that remembers what is pending
///
/// Used by tests to observe scheduling, and able to simulate a failing
/// backend.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    pending: Mutex<Vec<RecordedNotification>>,
    cancelled: Mutex<Vec<NotificationId>>,
    failing: AtomicBool,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn pending(&self) -> Vec<RecordedNotification> {
        self.pending.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn cancelled(&self) -> Vec<NotificationId> {
        self.cancelled.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Unavailable("simulated failure".to_string()));
        }
        Ok(())
    }
}

impl NotificationScheduler for RecordingScheduler {
    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> Result<NotificationId, NotifyError> {
        self.check_available()?;
        let id = NotificationId::generate();
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?;
        pending.push(RecordedNotification {
            id: id.clone(),
            content: content.clone(),
            trigger: *trigger,
        });
        Ok(id)
    }

    fn cancel(&self, id: &NotificationId) -> Result<(), NotifyError> {
        self.check_available()?;
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?;
        let before = pending.len();
        pending.retain(|n| &n.id != id);
        if pending.len() == before {
            return Err(NotifyError::UnknownId(id.to_string()));
        }
        if let Ok(mut cancelled) = self.cancelled.lock() {
            cancelled.push(id.clone());
        }
        Ok(())
    }
}

/// Which scheduler backend to use, chosen by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Schedule nothing
    #[default]
    Noop,
    /// Log every schedule/cancel request
    Log,
}

impl NotifierKind {
    pub fn build(self) -> Arc<dyn NotificationScheduler> {
        match self {
            NotifierKind::Noop => Arc::new(NoopScheduler),
            NotifierKind::Log => Arc::new(LogScheduler),
        }
    }
}
