/// Storage layer for persisting tracker state
///
/// Everything is stored as one JSON document per key in a key-value store.
/// The tracker treats the store as a write-behind cache: reads of malformed
/// data fall back to defaults and failed writes are logged, never raised.

pub mod memory;
pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Keys under which each collection is stored
pub mod keys {
    pub const HABITS: &str = "habits";
    pub const HABIT_ENTRIES: &str = "habitEntries";
    pub const FASTING_SETTINGS: &str = "fastingSettings";
    pub const FASTING_SESSIONS: &str = "fastingSessions";
    pub const STREAK_NOTIFICATION_SETTINGS: &str = "streakNotificationSettings";
    pub const NOTIFICATION_IDS: &str = "notificationIds";
}

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the key-value interface the tracker persists through
///
/// Each key holds one serialized collection. Implementations only need to
/// store strings; serialization happens in `load_or_default` / `save_json`.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Load and deserialize a collection, falling back to its default
///
/// Missing keys, read failures and malformed JSON all yield the default;
/// the latter two are logged.
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    load_or(store, key, T::default())
}

/// Load and deserialize a value, falling back to `fallback`
pub fn load_or<T>(store: &dyn KeyValueStore, key: &str, fallback: T) -> T
where
    T: DeserializeOwned,
{
    match try_load(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => fallback,
        Err(e) => {
            tracing::warn!("Could not load '{}', using defaults: {}", key, e);
            fallback
        }
    }
}

/// Load and deserialize a value, reporting read and parse failures
///
/// `Ok(None)` means the key was never written.
pub fn try_load<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and store a collection
///
/// Failures are logged and reported as `false`; in-memory state stays
/// authoritative either way.
pub fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));

    match result {
        Ok(()) => {
            tracing::debug!("Persisted '{}'", key);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to persist '{}': {}", key, e);
            false
        }
    }
}
