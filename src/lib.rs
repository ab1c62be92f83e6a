/// Public library interface for the habit and fasting tracker
///
/// The core is `Tracker`: habit streaks computed from a daily status log,
/// an auto-cycling fasting state machine, and milestone / fasting
/// reminders handed to a pluggable notification scheduler. Around it sit a
/// key-value persistence layer and an MCP stdio server exposing the core
/// as tools.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod clock;
pub mod config;
pub mod domain;
pub mod mcp;
pub mod notify;
pub mod storage;
pub mod tools;
pub mod tracker;

// Re-export the types most callers need
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};
pub use domain::*;
pub use notify::{
    NotificationScheduler, NotifierKind, NotifyError, RecordingScheduler,
    StreakNotificationSettings,
};
pub use storage::{KeyValueStore, MemoryKvStore, SqliteKvStore, StorageError};
pub use tracker::{ResumeReport, Tracker, TrackerDefaults};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The tracker wired up for serving MCP over stdio
pub struct HabitTrackerServer {
    tracker: Tracker,
}

impl HabitTrackerServer {
    /// Open the SQLite store at `db_path` and load the tracker from it
    ///
    /// The notification backend and first-run defaults come from `config`.
    pub fn new(db_path: PathBuf, config: &TrackerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing tracker with database: {:?}", db_path);
        let store = SqliteKvStore::new(db_path)?;
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Load the tracker from any key-value store, on the system clock
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: &TrackerConfig) -> Self {
        let tracker = Tracker::open_with_defaults(
            store,
            config.notifier.build(),
            Arc::new(SystemClock),
            config.tracker_defaults(),
        );
        Self { tracker }
    }

    /// Wrap an already constructed tracker
    pub fn with_tracker(tracker: Tracker) -> Self {
        Self { tracker }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Derived state is brought up to date once at startup, as if the app
    /// had just been foregrounded.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let report = self.tracker.on_resume();
        tracing::info!(
            "Server started with {} habit(s); auto-marked {}, fast in progress: {}",
            self.tracker.habits(false).len(),
            report.auto_marked.len(),
            report.current_session.is_some()
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }
}
