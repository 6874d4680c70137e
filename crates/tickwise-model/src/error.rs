//! Error types for parsing model values from user input.

use thiserror::Error;

/// Errors raised when a textual value cannot be turned into a model type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The priority is not one of `p1`..`p4` (or `1`..`4`).
    #[error("invalid priority: {value} (expected p1-p4)")]
    InvalidPriority {
        /// The rejected input.
        value: String,
    },

    /// The frequency is not a known recurrence frequency.
    #[error("invalid frequency: {value} (expected daily, weekly, monthly, yearly or custom)")]
    InvalidFrequency {
        /// The rejected input.
        value: String,
    },

    /// The weekday name could not be parsed.
    #[error("invalid weekday: {value}")]
    InvalidWeekday {
        /// The rejected input.
        value: String,
    },

    /// The edit mode is not `single`, `future` or `all`.
    #[error("invalid edit mode: {value} (expected single, future or all)")]
    InvalidEditMode {
        /// The rejected input.
        value: String,
    },
}

impl ModelError {
    /// Creates an invalid priority error.
    pub fn invalid_priority(value: impl Into<String>) -> Self {
        ModelError::InvalidPriority {
            value: value.into(),
        }
    }

    /// Creates an invalid frequency error.
    pub fn invalid_frequency(value: impl Into<String>) -> Self {
        ModelError::InvalidFrequency {
            value: value.into(),
        }
    }

    /// Creates an invalid weekday error.
    pub fn invalid_weekday(value: impl Into<String>) -> Self {
        ModelError::InvalidWeekday {
            value: value.into(),
        }
    }

    /// Creates an invalid edit mode error.
    pub fn invalid_edit_mode(value: impl Into<String>) -> Self {
        ModelError::InvalidEditMode {
            value: value.into(),
        }
    }
}

/// Result type for model parsing.
pub type Result<T> = std::result::Result<T, ModelError>;
