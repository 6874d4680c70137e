//! Filter query parser and evaluator.
//!
//! This module parses the task query language and evaluates it against
//! [`Task`] records.
//!
//! # Supported Syntax
//!
//! ## Conditions
//! - `field:value` - keyword or substring match, depending on the field
//! - `field=value`, `field!=value` - equality and its negation
//! - `field<value`, `field>value`, `field<=value`, `field>=value` - ordering
//!   (numeric and date fields only)
//! - `field:from to` - inclusive range
//! - `"quoted values"` keep spaces and parentheses
//!
//! ## Fields
//! - `priority`, `status`/`state`, `label`, `project`, `assigned`/`assignee`
//! - `mycreated`, `shared`, `search`/`text`, `subtask`
//! - `due` (`today`, `tomorrow`, `overdue`, `upcoming`, `thisweek`, `none`, dates)
//! - `created` (`today`), `completed` (`today`, `yesterday`, `thisweek`, `thismonth`, ranges)
//! - `comments`/`commentcount` (numeric)
//!
//! ## Boolean Operators
//! - `AND`, `OR`, `NOT` (any case)
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use tickwise_model::models::{Priority, Task};
//! use tickwise_store::filter::{apply_advanced_filter, FilterContext};
//!
//! let mut urgent = Task::new("1", "Fix outage", Utc::now());
//! urgent.priority = Some(Priority::P1);
//! let relaxed = Task::new("2", "Read book", Utc::now());
//!
//! let tasks = vec![urgent, relaxed];
//! let matched = apply_advanced_filter("priority:p1", &tasks, &FilterContext::new());
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].id, "1");
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{Comparator, Condition, Filter};
pub use error::{FilterError, FilterResult};
pub use evaluator::{FieldFn, FieldRegistry, FilterContext, FilterEvaluator};
pub use lexer::{FilterToken, Keyword, Lexer, PositionedToken};
pub use parser::FilterParser;

use tickwise_model::models::Task;

/// Evaluates `query` against a single task.
///
/// A blank query matches every task. A query that fails to parse matches
/// nothing.
pub fn parse_and_evaluate(query: &str, task: &Task, context: &FilterContext) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    match FilterParser::parse(query) {
        Ok(filter) => FilterEvaluator::new(&filter, context).matches(task),
        Err(e) => {
            tracing::debug!(query, error = %e, "filter failed to parse; matching nothing");
            false
        }
    }
}

/// Returns the tasks matching `query`, parsing it once.
///
/// Same blank and parse-failure rules as [`parse_and_evaluate`].
pub fn apply_advanced_filter<'t>(
    query: &str,
    tasks: &'t [Task],
    context: &FilterContext,
) -> Vec<&'t Task> {
    if query.trim().is_empty() {
        return tasks.iter().collect();
    }
    match FilterParser::parse(query) {
        Ok(filter) => FilterEvaluator::new(&filter, context).filter_tasks(tasks),
        Err(e) => {
            tracing::debug!(query, error = %e, "filter failed to parse; matching nothing");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests;
