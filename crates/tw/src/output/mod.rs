//! Output formatting utilities for the tw CLI.
//!
//! This module provides functions for formatting data as tables or JSON:
//!
//! - [`tasks`] - Task output formatting (list, show, done, instance edits)
//! - [`helpers`] - Common formatting utilities (truncation, priority, due dates)

use chrono::NaiveDate;

pub mod helpers;
mod tasks;

pub use tasks::{
    format_done_results_json, format_done_results_table, format_instance_change,
    format_instance_change_json, format_task_details_json, format_task_details_table,
    format_task_json, format_tasks_json, format_tasks_table,
};

/// Settings that affect human-readable output.
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    /// Reference date for relative due dates.
    pub today: NaiveDate,
    /// Print `YYYY-MM-DD` instead of relative dates.
    pub iso_dates: bool,
    pub use_colors: bool,
}
