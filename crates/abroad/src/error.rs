//! Error types for abroad.
//!
//! This module defines all error types used throughout the abroad crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for abroad operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// No storage session is available yet.
    #[error("no database loaded")]
    StorageUnavailable,

    /// A study record with the given id does not exist.
    #[error("no study record with id {id}")]
    RecordNotFound {
        /// The id that was looked up.
        id: i64,
    },

    /// A column name is not part of the table's column set.
    #[error("unknown column '{column}' for table {table}")]
    UnknownColumn {
        /// Table that was queried.
        table: &'static str,
        /// The rejected column name.
        column: String,
    },

    // === Import/Export Errors ===
    /// A binary snapshot could not be loaded.
    #[error("invalid database snapshot {path}: {message}")]
    SnapshotInvalid {
        /// Path of the snapshot file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// A textual SQL script failed to execute.
    #[error("SQL script {path} failed: {source}")]
    ScriptFailed {
        /// Path of the script file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A textual SQL script is not valid UTF-8.
    #[error("SQL script {path} is not UTF-8 text: {source}")]
    ScriptEncoding {
        /// Path of the script file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::str::Utf8Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Form Errors ===
    /// A submitted form field could not be interpreted.
    #[error("invalid form input: {message}")]
    FormInput {
        /// Description of the problem.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for abroad operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a snapshot error for the given file.
    #[must_use]
    pub fn snapshot_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SnapshotInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a form input error.
    #[must_use]
    pub fn form_input(message: impl Into<String>) -> Self {
        Self::FormInput {
            message: message.into(),
        }
    }

    /// Check if this error means the tables or the storage itself are missing.
    ///
    /// Query callers treat these as "no data available" rather than failures.
    #[must_use]
    pub fn is_missing_data(&self) -> bool {
        match self {
            Self::StorageUnavailable => true,
            Self::DatabaseQuery(rusqlite::Error::SqliteFailure(_, Some(message))) => {
                message.starts_with("no such table") || message.starts_with("no such column")
            }
            _ => false,
        }
    }
}
