//! Data records for tickwise.
//!
//! # Quick Start
//!
//! For convenient imports, use the prelude:
//!
//! ```
//! use tickwise_model::prelude::*;
//! ```
//!
//! This re-exports the task record, its partial-update companion, priorities,
//! recurrence patterns and the model error type.

pub mod error;
pub mod models;
pub mod prelude;
