//! Task model.
//!
//! This module defines the [`Task`] record together with its creation input
//! ([`NewTask`]) and partial-update companion ([`TaskUpdate`]).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecurrencePattern;
use crate::error::ModelError;

/// A task.
///
/// A task carrying a [`RecurrencePattern`] is the anchor of a series; its
/// occurrences are derived from the pattern until they are completed or
/// edited, at which point they become standalone records of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// The unique identifier for the task (UUID v4 text).
    pub id: String,

    /// The text content of the task.
    pub content: String,

    /// A longer description of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the task is completed.
    #[serde(default)]
    pub completed: bool,

    /// When the task was completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Task priority, `p1` being the most urgent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// The day the task is due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// The time of day the task is due, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<NaiveTime>,

    /// Estimated duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    /// Position among siblings.
    #[serde(default)]
    pub order: i32,

    /// The user who created the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Users the task is assigned to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,

    /// Labels attached to the task.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,

    /// The project the task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// The section the task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,

    /// The parent task, if this is a subtask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,

    /// The repetition rule, present on series anchors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrencePattern>,

    /// When the task was created.
    pub created_at: DateTime<Utc>,

    /// When the task was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a bare task with the given id and content.
    pub fn new(id: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            description: None,
            completed: false,
            completed_at: None,
            priority: None,
            due_date: None,
            due_time: None,
            duration_minutes: None,
            order: 0,
            created_by: None,
            assignees: Vec::new(),
            labels: BTreeSet::new(),
            project_id: None,
            section_id: None,
            parent_task_id: None,
            recurrence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this task is a subtask (has a parent).
    pub fn is_subtask(&self) -> bool {
        self.parent_task_id.is_some()
    }

    /// Returns true if this task anchors a recurring series.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Returns true if the task carries the given label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// Task priority.
///
/// Serialized as `"p1"`..`"p4"`; `P1` is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    /// All priorities from most to least urgent.
    pub const ALL: [Priority; 4] = [Priority::P1, Priority::P2, Priority::P3, Priority::P4];

    /// Returns the short label (`"p1"`..`"p4"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P1 => "p1",
            Priority::P2 => "p2",
            Priority::P3 => "p3",
            Priority::P4 => "p4",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ModelError;

    /// Accepts `p1`..`p4` in any case, or a bare digit `1`..`4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('p')
            .or_else(|| trimmed.strip_prefix('P'))
            .unwrap_or(trimmed);
        match digits {
            "1" => Ok(Priority::P1),
            "2" => Ok(Priority::P2),
            "3" => Ok(Priority::P3),
            "4" => Ok(Priority::P4),
            _ => Err(ModelError::invalid_priority(s)),
        }
    }
}

/// Input for creating a task. The store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub content: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub order: i32,
    pub created_by: Option<String>,
    pub assignees: Vec<String>,
    pub labels: BTreeSet<String>,
    pub project_id: Option<String>,
    pub section_id: Option<String>,
    pub parent_task_id: Option<String>,
    pub recurrence: Option<RecurrencePattern>,
}

impl NewTask {
    /// Starts a new task with only its content set.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Builds the stored record.
    pub fn into_task(self, id: impl Into<String>, now: DateTime<Utc>) -> Task {
        Task {
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            due_time: self.due_time,
            duration_minutes: self.duration_minutes,
            order: self.order,
            created_by: self.created_by,
            assignees: self.assignees,
            labels: self.labels,
            project_id: self.project_id,
            section_id: self.section_id,
            parent_task_id: self.parent_task_id,
            recurrence: self.recurrence,
            ..Task::new(id, self.content, now)
        }
    }
}

/// A partial update of a [`Task`].
///
/// `None` leaves a field untouched. Clearable fields use `Option<Option<T>>`,
/// where `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub content: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Option<Priority>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub due_time: Option<Option<NaiveTime>>,
    pub duration_minutes: Option<Option<u32>>,
    pub order: Option<i32>,
    pub assignees: Option<Vec<String>>,
    pub labels: Option<BTreeSet<String>>,
    pub project_id: Option<Option<String>>,
    pub section_id: Option<Option<String>>,
    pub parent_task_id: Option<Option<String>>,
    pub recurrence: Option<Option<RecurrencePattern>>,
}

impl TaskUpdate {
    /// Returns true if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self == &TaskUpdate::default()
    }

    /// Writes every set field into `task`.
    ///
    /// Timestamps other than `completed_at` are left to the caller.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(content) = &self.content {
            task.content = content.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(duration) = self.duration_minutes {
            task.duration_minutes = duration;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        if let Some(assignees) = &self.assignees {
            task.assignees = assignees.clone();
        }
        if let Some(labels) = &self.labels {
            task.labels = labels.clone();
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = project_id.clone();
        }
        if let Some(section_id) = &self.section_id {
            task.section_id = section_id.clone();
        }
        if let Some(parent_task_id) = &self.parent_task_id {
            task.parent_task_id = parent_task_id.clone();
        }
        if let Some(recurrence) = &self.recurrence {
            task.recurrence = recurrence.clone();
        }
    }
}
