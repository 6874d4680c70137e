//! Filter evaluation against tasks.
//!
//! Conditions are dispatched through a [`FieldRegistry`], a table from
//! lower-cased field name to evaluator function. Unknown fields evaluate to
//! `false`.
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, Utc};
//! use tickwise_model::models::{Priority, Task};
//! use tickwise_store::filter::{FilterContext, FilterEvaluator, FilterParser};
//!
//! let filter = FilterParser::parse("priority:p1 AND status:active").unwrap();
//! let context = FilterContext::new().with_today(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
//!
//! let mut task = Task::new("1", "Ship it", Utc::now());
//! task.priority = Some(Priority::P1);
//!
//! let evaluator = FilterEvaluator::new(&filter, &context);
//! assert!(evaluator.matches(&task));
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use strsim::levenshtein;
use tickwise_model::models::Task;

use super::ast::{Comparator, Condition, Filter};
use super::error::{FilterError, FilterResult};

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Signature of a field evaluator.
pub type FieldFn = fn(&Condition, &Task, &FilterContext) -> bool;

/// Inputs to filter evaluation that do not live on the task itself.
#[derive(Debug, Clone)]
pub struct FilterContext {
    /// The date buckets (`today`, `overdue`, ...) are relative to.
    pub today: NaiveDate,
    /// First day of the calendar week for `thisweek`.
    pub week_start: Weekday,
    /// Identity `assigned:me` resolves to.
    pub current_user: Option<String>,
    /// Comment counts per task id; missing ids count as zero.
    pub comment_counts: HashMap<String, usize>,
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterContext {
    /// Creates a context for the current local date, weeks starting Monday.
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
            week_start: Weekday::Mon,
            current_user: None,
            comment_counts: HashMap::new(),
        }
    }

    /// Pins the reference date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Sets the first day of the week.
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Sets the user `assigned:me` refers to.
    pub fn with_current_user(mut self, user: impl Into<String>) -> Self {
        self.current_user = Some(user.into());
        self
    }

    /// Supplies comment counts keyed by task id.
    pub fn with_comment_counts(mut self, counts: HashMap<String, usize>) -> Self {
        self.comment_counts = counts;
        self
    }

    /// Returns the number of comments on a task.
    pub fn comment_count(&self, task_id: &str) -> usize {
        self.comment_counts.get(task_id).copied().unwrap_or(0)
    }

    /// Returns the first and last day of the week containing `today`.
    pub fn week_bounds(&self) -> (NaiveDate, NaiveDate) {
        let offset = (7 + self.today.weekday().num_days_from_monday()
            - self.week_start.num_days_from_monday())
            % 7;
        let start = self.today - chrono::Duration::days(i64::from(offset));
        (start, start + chrono::Duration::days(6))
    }

    fn in_this_week(&self, date: NaiveDate) -> bool {
        let (start, end) = self.week_bounds();
        start <= date && date <= end
    }

    fn tomorrow(&self) -> NaiveDate {
        self.today + chrono::Duration::days(1)
    }

    fn yesterday(&self) -> NaiveDate {
        self.today - chrono::Duration::days(1)
    }

    /// Resolves `today`/`tomorrow`/`yesterday` or a `YYYY-MM-DD` date.
    fn resolve_date(&self, value: &str) -> Option<NaiveDate> {
        match value.to_lowercase().as_str() {
            "today" => Some(self.today),
            "tomorrow" => Some(self.tomorrow()),
            "yesterday" => Some(self.yesterday()),
            _ => parse_iso_date(value),
        }
    }
}

/// Table of field evaluators keyed by lower-cased field name.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, FieldFn>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in field and alias.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: &[(&str, FieldFn)] = &[
            ("priority", priority_field),
            ("status", status_field),
            ("state", status_field),
            ("label", label_field),
            ("labels", label_field),
            ("project", project_field),
            ("assigned", assigned_field),
            ("assignee", assigned_field),
            ("mycreated", created_by_field),
            ("mycreations", created_by_field),
            ("shared", shared_field),
            ("inshared", shared_field),
            ("due", due_field),
            ("duedate", due_field),
            ("created", created_field),
            ("createddate", created_field),
            ("completed", completed_field),
            ("completeddate", completed_field),
            ("search", search_field),
            ("text", search_field),
            ("subtask", subtask_field),
            ("subtasks", subtask_field),
            ("comments", comments_field),
            ("commentcount", comments_field),
        ];
        for &(name, evaluator) in builtins {
            registry.register(name, evaluator);
        }
        registry
    }

    /// Returns the shared built-in registry.
    pub fn builtins() -> &'static FieldRegistry {
        static BUILTINS: OnceLock<FieldRegistry> = OnceLock::new();
        BUILTINS.get_or_init(FieldRegistry::with_builtins)
    }

    /// Registers (or replaces) a field evaluator.
    pub fn register(&mut self, name: &str, evaluator: FieldFn) {
        self.fields.insert(name.to_lowercase(), evaluator);
    }

    /// Looks up the evaluator for a field.
    pub fn get(&self, name: &str) -> Option<FieldFn> {
        self.fields.get(&name.to_lowercase()).copied()
    }

    /// Returns true if the field has an evaluator.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over registered field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the closest registered name to `field`, if it is close enough.
    pub fn suggest(&self, field: &str) -> Option<String> {
        let query = field.to_lowercase();
        let (best, distance) = self
            .names()
            .map(|name| (name, levenshtein(&query, name)))
            .min_by_key(|(_, d)| *d)?;

        if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
            Some(best.to_string())
        } else {
            None
        }
    }

    /// Fails on the first condition whose field is not registered.
    pub fn check_fields(&self, filter: &Filter) -> FilterResult<()> {
        for condition in filter.conditions() {
            if !self.contains(&condition.field) {
                return Err(FilterError::unknown_field(
                    condition.field.clone(),
                    self.suggest(&condition.field),
                ));
            }
        }
        Ok(())
    }
}

/// Evaluates a parsed filter against tasks.
#[derive(Debug)]
pub struct FilterEvaluator<'a> {
    filter: &'a Filter,
    context: &'a FilterContext,
    registry: &'a FieldRegistry,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates an evaluator using the built-in fields.
    pub fn new(filter: &'a Filter, context: &'a FilterContext) -> Self {
        Self::with_registry(filter, context, FieldRegistry::builtins())
    }

    /// Creates an evaluator using a custom field table.
    pub fn with_registry(
        filter: &'a Filter,
        context: &'a FilterContext,
        registry: &'a FieldRegistry,
    ) -> Self {
        Self {
            filter,
            context,
            registry,
        }
    }

    /// Returns true if the task matches the filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.evaluate(self.filter, task)
    }

    /// Filters a slice of tasks, returning only those that match.
    pub fn filter_tasks<'b>(&self, tasks: &'b [Task]) -> Vec<&'b Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    fn evaluate(&self, filter: &Filter, task: &Task) -> bool {
        match filter {
            Filter::Condition(condition) => self.evaluate_condition(condition, task),
            Filter::And(left, right) => self.evaluate(left, task) && self.evaluate(right, task),
            Filter::Or(left, right) => self.evaluate(left, task) || self.evaluate(right, task),
            Filter::Not(inner) => !self.evaluate(inner, task),
        }
    }

    fn evaluate_condition(&self, condition: &Condition, task: &Task) -> bool {
        match self.registry.get(&condition.field) {
            Some(evaluator) => evaluator(condition, task, self.context),
            None => false,
        }
    }
}

// ==================== Helpers ====================

/// Applies `:`/`=` semantics, negating for `!=`. Ordering operators never
/// match on text fields.
fn match_text(condition: &Condition, matches: impl FnOnce(&str) -> bool) -> bool {
    match condition.comparator {
        Comparator::Colon | Comparator::Eq | Comparator::Between => matches(&condition.value),
        Comparator::Ne => !matches(&condition.value),
        Comparator::Lt | Comparator::Gt | Comparator::Le | Comparator::Ge => false,
    }
}

fn compare(comparator: Comparator, ordering: Ordering) -> bool {
    match comparator {
        Comparator::Colon | Comparator::Eq => ordering == Ordering::Equal,
        Comparator::Ne => ordering != Ordering::Equal,
        Comparator::Lt => ordering == Ordering::Less,
        Comparator::Gt => ordering == Ordering::Greater,
        Comparator::Le => ordering != Ordering::Greater,
        Comparator::Ge => ordering != Ordering::Less,
        Comparator::Between => false,
    }
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date at local midnight.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value.trim()) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = parse_iso_date(value)?;
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}

fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

// ==================== Field Evaluators ====================

fn priority_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| {
        task.priority.is_some_and(|p| p.as_str() == value)
    })
}

fn status_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| match value.to_lowercase().as_str() {
        "active" => !task.completed,
        "completed" | "done" => task.completed,
        _ => false,
    })
}

fn label_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| {
        task.labels.iter().any(|label| label.contains(value))
    })
}

fn project_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| {
        task.project_id
            .as_deref()
            .is_some_and(|project| project.contains(value))
    })
}

fn assigned_field(condition: &Condition, task: &Task, context: &FilterContext) -> bool {
    match_text(condition, |value| match value.to_lowercase().as_str() {
        "me" => context
            .current_user
            .as_deref()
            .is_some_and(|me| task.assignees.iter().any(|a| a == me)),
        "unassigned" => task.assignees.is_empty(),
        _ => task.assignees.iter().any(|a| a.contains(value)),
    })
}

fn created_by_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| task.created_by.as_deref() == Some(value))
}

// Sharing is resolved by the store layer; the field only recognises the flag.
fn shared_field(condition: &Condition, _: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| {
        matches!(value.to_lowercase().as_str(), "true" | "yes")
    })
}

fn due_field(condition: &Condition, task: &Task, context: &FilterContext) -> bool {
    match condition.comparator {
        Comparator::Colon | Comparator::Eq | Comparator::Ne => {
            match_text(condition, |value| due_matches(value, task.due_date, context))
        }
        Comparator::Between => {
            let bounds = (
                task.due_date,
                context.resolve_date(&condition.value),
                condition
                    .value2
                    .as_deref()
                    .and_then(|v| context.resolve_date(v)),
            );
            let (Some(due), Some(from), Some(to)) = bounds else {
                return false;
            };
            from <= due && due <= to
        }
        op => {
            let (Some(due), Some(target)) = (task.due_date, context.resolve_date(&condition.value))
            else {
                return false;
            };
            compare(op, due.cmp(&target))
        }
    }
}

fn due_matches(value: &str, due: Option<NaiveDate>, context: &FilterContext) -> bool {
    let keyword = value.to_lowercase();
    if matches!(keyword.as_str(), "none" | "nodate") {
        return due.is_none();
    }
    let Some(due) = due else {
        return false;
    };
    match keyword.as_str() {
        "today" => due == context.today,
        "tomorrow" => due == context.tomorrow(),
        "overdue" => due < context.today,
        "upcoming" => due > context.today,
        "thisweek" => context.in_this_week(due),
        _ => parse_iso_date(value) == Some(due),
    }
}

fn created_field(condition: &Condition, task: &Task, context: &FilterContext) -> bool {
    match_text(condition, |value| {
        value.eq_ignore_ascii_case("today") && local_date(task.created_at) == context.today
    })
}

fn completed_field(condition: &Condition, task: &Task, context: &FilterContext) -> bool {
    let Some(completed_at) = task.completed_at else {
        return condition.comparator == Comparator::Ne;
    };

    if condition.comparator == Comparator::Between {
        let from = parse_timestamp(&condition.value);
        let to = condition.value2.as_deref().and_then(parse_timestamp);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        return from <= completed_at && completed_at <= to;
    }

    let day = local_date(completed_at);
    match_text(condition, |value| match value.to_lowercase().as_str() {
        "today" => day == context.today,
        "yesterday" => day == context.yesterday(),
        "thisweek" => context.in_this_week(day),
        "thismonth" => day.year() == context.today.year() && day.month() == context.today.month(),
        _ => false,
    })
}

fn search_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| {
        let needle = value.to_lowercase();
        task.content.to_lowercase().contains(&needle)
            || task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    })
}

fn subtask_field(condition: &Condition, task: &Task, _: &FilterContext) -> bool {
    match_text(condition, |value| match value.to_lowercase().as_str() {
        "parent" | "hassubtasks" => task.parent_task_id.is_none(),
        "subtask" | "child" => task.parent_task_id.is_some(),
        _ => false,
    })
}

fn comments_field(condition: &Condition, task: &Task, context: &FilterContext) -> bool {
    let count = context.comment_count(&task.id);
    let Ok(target) = condition.value.trim().parse::<usize>() else {
        return false;
    };

    if condition.comparator == Comparator::Between {
        let Some(upper) = condition
            .value2
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
        else {
            return false;
        };
        return target <= count && count <= upper;
    }

    compare(condition.comparator, count.cmp(&target))
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
