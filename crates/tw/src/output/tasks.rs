//! Task output formatting.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use tickwise_model::models::{Priority, RecurrencePattern, Task};
use tickwise_store::recurrence::describe;
use tickwise_store::{CompletionResult, InstanceChange};

use crate::commands::done::DoneResult;
use crate::commands::show::ShowResult;

use super::helpers::{
    format_datetime, format_due, format_due_verbose, format_labels, format_priority,
    format_priority_verbose, truncate_id, truncate_str,
};
use super::DisplayOptions;

/// JSON output structure for list command.
#[derive(Serialize)]
pub struct ListOutput<'a> {
    pub tasks: Vec<TaskOutput<'a>>,
    /// Number of matching tasks before the limit was applied.
    pub total: usize,
    pub truncated: bool,
}

/// JSON output structure for a single task.
#[derive(Serialize)]
pub struct TaskOutput<'a> {
    pub id: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub project_id: Option<&'a str>,
    pub section_id: Option<&'a str>,
    pub parent_id: Option<&'a str>,
    pub labels: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub assignees: &'a [String],
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceOutput<'a>>,
    pub created_at: DateTime<Utc>,
}

/// JSON output for a task's recurrence.
#[derive(Serialize)]
pub struct RecurrenceOutput<'a> {
    pub summary: String,
    pub pattern: &'a RecurrencePattern,
}

impl<'a> From<&'a Task> for TaskOutput<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: &task.id,
            content: &task.content,
            description: task.description.as_deref(),
            priority: task.priority,
            due_date: task.due_date,
            due_time: task.due_time,
            duration_minutes: task.duration_minutes,
            project_id: task.project_id.as_deref(),
            section_id: task.section_id.as_deref(),
            parent_id: task.parent_task_id.as_deref(),
            labels: &task.labels,
            assignees: &task.assignees,
            completed: task.completed,
            completed_at: task.completed_at,
            recurrence: task.recurrence.as_ref().map(|pattern| RecurrenceOutput {
                summary: describe(pattern),
                pattern,
            }),
            created_at: task.created_at,
        }
    }
}

/// JSON output structure for task details (show command).
#[derive(Serialize)]
pub struct TaskDetailsOutput<'a> {
    #[serde(flatten)]
    pub task: TaskOutput<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskOutput<'a>>,
    #[serde(skip_serializing_if = "<[NaiveDate]>::is_empty")]
    pub upcoming: &'a [NaiveDate],
}

/// JSON output for a subtask.
#[derive(Serialize)]
pub struct SubtaskOutput<'a> {
    pub id: &'a str,
    pub content: &'a str,
    pub completed: bool,
}

/// JSON output for one completed task.
#[derive(Serialize)]
pub struct DoneOutput<'a> {
    pub id: &'a str,
    pub content: &'a str,
    /// `completed`, `recurring` or `unchanged`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<TaskOutput<'a>>,
}

/// JSON output for an instance edit or delete.
#[derive(Serialize)]
pub struct InstanceChangeOutput<'a> {
    /// `unchanged`, `materialized`, `exception_added`, `truncated`,
    /// `updated` or `deleted`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone: Option<TaskOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_id: Option<&'a str>,
}

/// Formats tasks as JSON.
pub fn format_tasks_json(tasks: &[&Task], total: usize) -> Result<String, serde_json::Error> {
    let output = ListOutput {
        tasks: tasks.iter().map(|task| TaskOutput::from(*task)).collect(),
        total,
        truncated: total > tasks.len(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a single task as JSON.
pub fn format_task_json(task: &Task) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&TaskOutput::from(task))
}

/// Formats tasks as a table.
pub fn format_tasks_table(tasks: &[&Task], display: &DisplayOptions) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let mut output = String::new();

    let header = format!(
        "{:<10} {:<4} {:<12} {:<15} {:<2} {}",
        "ID", "Pri", "Due", "Labels", "", "Content"
    );
    if display.use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for task in tasks {
        let id_prefix = truncate_id(&task.id);
        let priority = pad(
            format_priority(task.priority, display.use_colors),
            format_priority(task.priority, false).chars().count(),
            4,
        );
        let due = pad(
            format_due(task.due_date, display.today, display.iso_dates, display.use_colors),
            format_due(task.due_date, display.today, display.iso_dates, false)
                .chars()
                .count(),
            12,
        );
        let labels = format_labels(&task.labels, 15);
        let marker = match (task.completed, task.is_recurring()) {
            (true, _) => "✓",
            (false, true) => "↻",
            (false, false) => "",
        };
        let content = truncate_str(&task.content, 60);

        output.push_str(&format!(
            "{:<10} {} {} {:<15} {:<2} {}\n",
            id_prefix, priority, due, labels, marker, content
        ));
    }

    output
}

/// Left-aligns `text` whose visible width is `visible` characters.
///
/// Colour escape codes don't count towards the width, so `format!` padding
/// can't be used on coloured cells.
fn pad(text: String, visible: usize, width: usize) -> String {
    let fill = width.saturating_sub(visible);
    text + &" ".repeat(fill)
}

/// Formats task details as JSON (show command).
pub fn format_task_details_json(result: &ShowResult) -> Result<String, serde_json::Error> {
    let output = TaskDetailsOutput {
        task: TaskOutput::from(&result.task),
        subtasks: result
            .subtasks
            .iter()
            .map(|t| SubtaskOutput {
                id: &t.id,
                content: &t.content,
                completed: t.completed,
            })
            .collect(),
        upcoming: &result.upcoming,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats task details as a human-readable table (show command).
pub fn format_task_details_table(result: &ShowResult, display: &DisplayOptions) -> String {
    let task = &result.task;
    let mut output = String::new();

    let content_label = if display.use_colors {
        "Task:".bold().to_string()
    } else {
        "Task:".to_string()
    };
    output.push_str(&format!("{} {}\n", content_label, task.content));
    output.push_str(&format!("ID: {}\n", task.id));

    let status = if task.completed { "completed" } else { "active" };
    output.push_str(&format!("Status: {}\n", status));

    if let Some(ref project) = task.project_id {
        output.push_str(&format!("Project: {}\n", project));
    }
    if let Some(ref section) = task.section_id {
        output.push_str(&format!("Section: {}\n", section));
    }
    if let Some(ref parent) = task.parent_task_id {
        output.push_str(&format!("Parent: {}\n", parent));
    }

    output.push_str(&format!(
        "Priority: {}\n",
        format_priority_verbose(task.priority, display.use_colors)
    ));

    if let Some(due) = task.due_date {
        output.push_str(&format!(
            "Due: {}\n",
            format_due_verbose(
                due,
                task.due_time,
                display.today,
                display.iso_dates,
                display.use_colors
            )
        ));
    }
    if let Some(minutes) = task.duration_minutes {
        output.push_str(&format!("Duration: {} min\n", minutes));
    }
    if let Some(ref pattern) = task.recurrence {
        output.push_str(&format!("Repeats: {}\n", describe(pattern)));
    }

    if !task.labels.is_empty() {
        let labels: Vec<String> = task.labels.iter().map(|l| format!("@{}", l)).collect();
        output.push_str(&format!("Labels: {}\n", labels.join(", ")));
    }
    if !task.assignees.is_empty() {
        output.push_str(&format!("Assigned: {}\n", task.assignees.join(", ")));
    }
    if let Some(ref creator) = task.created_by {
        output.push_str(&format!("Created by: {}\n", creator));
    }

    output.push_str(&format!("Created: {}\n", format_datetime(task.created_at)));
    if let Some(completed_at) = task.completed_at {
        output.push_str(&format!("Completed: {}\n", format_datetime(completed_at)));
    }

    if let Some(ref description) = task.description {
        output.push_str("Description:\n");
        for line in description.lines() {
            output.push_str(&format!("  {}\n", line));
        }
    }

    if !result.subtasks.is_empty() {
        output.push_str(&format!("\nSubtasks ({}):\n", result.subtasks.len()));
        for subtask in &result.subtasks {
            let checkbox = if subtask.completed { "[x]" } else { "[ ]" };
            output.push_str(&format!(
                "  {} {} ({})\n",
                checkbox,
                subtask.content,
                truncate_id(&subtask.id)
            ));
        }
    }

    if !result.upcoming.is_empty() {
        output.push_str(&format!("\nUpcoming ({}):\n", result.upcoming.len()));
        for date in &result.upcoming {
            output.push_str(&format!("  {}\n", date.format("%a %Y-%m-%d")));
        }
    }

    output
}

/// Formats done results as JSON.
pub fn format_done_results_json(results: &[DoneResult]) -> Result<String, serde_json::Error> {
    let output: Vec<DoneOutput> = results
        .iter()
        .map(|result| {
            let (status, next) = match &result.outcome {
                CompletionResult::Single(_) => ("completed", None),
                CompletionResult::Recurring { next, .. } => {
                    ("recurring", Some(TaskOutput::from(next)))
                }
                CompletionResult::Unchanged => ("unchanged", None),
            };
            DoneOutput {
                id: &result.id,
                content: &result.content,
                status,
                next,
            }
        })
        .collect();

    serde_json::to_string_pretty(&output)
}

/// Formats done results for humans, one line per task.
pub fn format_done_results_table(results: &[DoneResult], display: &DisplayOptions) -> String {
    let mut output = String::new();

    for result in results {
        let id = truncate_id(&result.id);
        let line = match &result.outcome {
            CompletionResult::Single(_) => format!("Completed: {} ({})", result.content, id),
            CompletionResult::Recurring { next, .. } => {
                let due = format_due(next.due_date, display.today, display.iso_dates, false);
                format!(
                    "Completed: {} ({}), next due {} ({})",
                    result.content,
                    id,
                    due,
                    truncate_id(&next.id)
                )
            }
            CompletionResult::Unchanged => {
                format!("Already completed: {} ({})", result.content, id)
            }
        };
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Formats an instance edit or delete as JSON.
pub fn format_instance_change_json(change: &InstanceChange) -> Result<String, serde_json::Error> {
    let mut output = InstanceChangeOutput {
        status: "unchanged",
        task: None,
        standalone: None,
        deleted_id: None,
    };

    match change {
        InstanceChange::Unchanged => {}
        InstanceChange::Materialized { standalone, anchor } => {
            output.status = "materialized";
            output.task = Some(TaskOutput::from(anchor));
            output.standalone = Some(TaskOutput::from(standalone));
        }
        InstanceChange::ExceptionAdded(anchor) => {
            output.status = "exception_added";
            output.task = Some(TaskOutput::from(anchor));
        }
        InstanceChange::Truncated(anchor) => {
            output.status = "truncated";
            output.task = Some(TaskOutput::from(anchor));
        }
        InstanceChange::Updated(anchor) => {
            output.status = "updated";
            output.task = Some(TaskOutput::from(anchor));
        }
        InstanceChange::Deleted(id) => {
            output.status = "deleted";
            output.deleted_id = Some(id);
        }
    }

    serde_json::to_string_pretty(&output)
}

/// Describes an instance edit or delete for humans.
pub fn format_instance_change(change: &InstanceChange, date: NaiveDate) -> String {
    match change {
        InstanceChange::Unchanged => {
            format!("No occurrence on {}; nothing changed.\n", date)
        }
        InstanceChange::Materialized { standalone, .. } => format!(
            "Occurrence on {} is now a separate task ({}).\n",
            date,
            truncate_id(&standalone.id)
        ),
        InstanceChange::ExceptionAdded(anchor) => {
            format!("Skipped {} for: {}\n", date, anchor.content)
        }
        InstanceChange::Truncated(anchor) => {
            let end = anchor
                .recurrence
                .as_ref()
                .and_then(|p| p.end_date)
                .map(|d| d.to_string())
                .unwrap_or_default();
            format!("Series now ends on {}: {}\n", end, anchor.content)
        }
        InstanceChange::Updated(anchor) => format!("Updated series: {}\n", anchor.content),
        InstanceChange::Deleted(id) => format!("Deleted series ({})\n", truncate_id(id)),
    }
}
