//! Core error types for nudgely-core.
//!
//! The recurrence and streak engines are total functions and never fail;
//! errors come from validating user input, from storage and from
//! configuration handling.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nudgely-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Lookup of a habit (or other record) that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn habit_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Habit",
            id: id.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Weekday index outside 0 (Sunday) ..= 6 (Saturday)
    #[error("Weekday index {0} out of range (expected 0-6, Sunday = 0)")]
    WeekdayOutOfRange(u8),

    /// Monthly anchor outside 1..=31
    #[error("Day of month {0} out of range (expected 1-31)")]
    DayOfMonthOutOfRange(u32),

    /// Weekday token that is neither an index nor a known group name
    #[error("Unknown weekday '{0}' (expected 0-6, weekdays, weekend or all)")]
    UnknownWeekday(String),

    /// Recurrence kind not in the enumerated set
    #[error("Unknown recurrence kind '{0}' (expected daily, weekly or monthly)")]
    UnknownKind(String),

    /// Unknown time-of-day flag
    #[error("Unknown time of day '{0}' (expected morning, afternoon or evening)")]
    UnknownTimeOfDay(String),

    /// Malformed HH:MM wall-clock value
    #[error("Invalid time for '{field}': {value} (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },

    /// Empty required field
    #[error("'{0}' must not be empty")]
    Empty(&'static str),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
