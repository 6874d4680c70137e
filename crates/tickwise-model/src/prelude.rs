//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```
//! use tickwise_model::prelude::*;
//!
//! // Now you have access to:
//! // - Task, NewTask, TaskUpdate, Priority (task records)
//! // - RecurrencePattern, Frequency, EditMode (recurrence)
//! // - ModelError (error handling)
//! ```

pub use crate::error::ModelError;

pub use crate::models::{
    parse_weekday, parse_weekdays, EditMode, Frequency, NewTask, Priority, RecurrencePattern,
    Task, TaskUpdate,
};
