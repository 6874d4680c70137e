//! Error types for task store operations.

use thiserror::Error;

use crate::recurrence::RecurrenceError;
use crate::store::DatabaseFileError;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by [`TaskStorage`](crate::TaskStorage) and
/// [`TaskStore`](crate::TaskStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No task has the given id.
    #[error("task not found: {id}")]
    NotFound {
        /// The id or prefix that was looked up.
        id: String,
    },

    /// An id prefix matched more than one task.
    #[error("ambiguous task id '{prefix}' matches: {}", .matches.join(", "))]
    AmbiguousId {
        /// The prefix that was looked up.
        prefix: String,
        /// Ids that start with the prefix.
        matches: Vec<String>,
    },

    /// A task with the given id already exists.
    #[error("task already exists: {id}")]
    Duplicate {
        /// The conflicting id.
        id: String,
    },

    /// A recurrence pattern failed validation.
    #[error("invalid recurrence: {0}")]
    InvalidPattern(#[from] RecurrenceError),

    /// The database file could not be read or written.
    #[error(transparent)]
    Database(#[from] DatabaseFileError),
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Returns true if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
