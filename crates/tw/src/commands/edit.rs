//! Edit command implementation.
//!
//! Updates a task's fields, or one occurrence of a recurring task when
//! `--instance` and `--mode` are given.

use chrono::NaiveDate;
use tickwise_model::models::{EditMode, Priority, Task, TaskUpdate};
use tickwise_store::{InstanceChange, TaskStorage, TaskStore};

use super::{parse_date, parse_time, CommandContext, Result};
use crate::output::helpers::truncate_id;
use crate::output::{format_instance_change, format_instance_change_json, format_task_json};

/// Options for the edit command.
#[derive(Debug, Default)]
pub struct EditOptions {
    /// Task ID or prefix.
    pub task_id: String,
    /// New content.
    pub content: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date.
    pub due: Option<String>,
    /// Remove the due date.
    pub no_due: bool,
    /// New due time (`HH:MM`).
    pub time: Option<String>,
    /// Set labels (replaces existing).
    pub labels: Vec<String>,
    /// Add a single label.
    pub add_label: Option<String>,
    /// Remove a single label.
    pub remove_label: Option<String>,
    /// New project; empty clears it.
    pub project: Option<String>,
    /// New description; empty clears it.
    pub description: Option<String>,
    /// Occurrence date for instance edits.
    pub instance: Option<String>,
    /// Which occurrences an instance edit applies to.
    pub mode: Option<EditMode>,
}

/// What an edit did.
#[derive(Debug)]
pub enum EditOutcome {
    /// No field was given.
    NoChanges(String),
    /// The task was updated directly.
    Updated(Task),
    /// A recurring occurrence was edited.
    Instance {
        date: NaiveDate,
        change: InstanceChange,
    },
}

/// Builds the field update from the options, against the task's current
/// labels.
pub fn build_update(opts: &EditOptions, current: &Task, today: NaiveDate) -> Result<TaskUpdate> {
    let mut update = TaskUpdate {
        content: opts.content.clone(),
        priority: opts.priority.map(Some),
        ..Default::default()
    };

    if opts.no_due {
        update.due_date = Some(None);
        update.due_time = Some(None);
    } else if let Some(ref due) = opts.due {
        update.due_date = Some(Some(parse_date(due, today)?));
    }
    if let Some(ref time) = opts.time {
        update.due_time = Some(Some(parse_time(time)?));
    }

    if !opts.labels.is_empty() {
        update.labels = Some(opts.labels.iter().cloned().collect());
    } else if opts.add_label.is_some() || opts.remove_label.is_some() {
        let mut labels = current.labels.clone();
        if let Some(ref label) = opts.add_label {
            labels.insert(label.clone());
        }
        if let Some(ref label) = opts.remove_label {
            labels.remove(label);
        }
        update.labels = Some(labels);
    }

    if let Some(ref project) = opts.project {
        update.project_id = Some(non_empty(project));
    }
    if let Some(ref description) = opts.description {
        update.description = Some(non_empty(description));
    }

    Ok(update)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Applies the edit described by `opts`.
pub async fn edit_task<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &EditOptions,
    today: NaiveDate,
) -> Result<EditOutcome> {
    let id = store.resolve_id(&opts.task_id).await?;
    let current = store.get_task(&id).await?;
    let update = build_update(opts, &current, today)?;

    if let (Some(instance), Some(mode)) = (&opts.instance, opts.mode) {
        let date = parse_date(instance, today)?;
        let change = store
            .edit_recurring_instance(&id, date, mode, update)
            .await?;
        return Ok(EditOutcome::Instance { date, change });
    }

    if update.is_empty() {
        return Ok(EditOutcome::NoChanges(id));
    }

    Ok(EditOutcome::Updated(store.update_task(&id, update).await?))
}

/// Executes the edit command.
///
/// # Errors
///
/// Returns an error if the task cannot be found, an argument is malformed,
/// or the database cannot be written.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &EditOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    match edit_task(store, opts, ctx.today()).await? {
        EditOutcome::NoChanges(id) => {
            if !ctx.quiet {
                if ctx.json_output {
                    let output = serde_json::json!({
                        "status": "no_changes",
                        "id": id,
                        "message": "No changes specified"
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("No changes specified for task {}", truncate_id(&id));
                }
            }
        }
        EditOutcome::Updated(task) => {
            if ctx.json_output {
                println!("{}", format_task_json(&task)?);
            } else if !ctx.quiet {
                println!("Updated: {} ({})", task.content, truncate_id(&task.id));
            }
        }
        EditOutcome::Instance { date, change } => {
            if ctx.json_output {
                println!("{}", format_instance_change_json(&change)?);
            } else if !ctx.quiet {
                print!("{}", format_instance_change(&change, date));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tickwise_model::models::{Frequency, NewTask, RecurrencePattern};
    use tickwise_store::LocalStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 3, 12)
    }

    #[test]
    fn test_build_update_labels_add_remove() {
        let mut task = Task::new("t1", "Sample", Utc::now());
        task.labels.insert("home".to_string());
        task.labels.insert("old".to_string());

        let opts = EditOptions {
            add_label: Some("new".to_string()),
            remove_label: Some("old".to_string()),
            ..Default::default()
        };
        let update = build_update(&opts, &task, today()).unwrap();
        let labels: Vec<&str> = update
            .labels
            .as_ref()
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(labels, vec!["home", "new"]);
    }

    #[test]
    fn test_build_update_no_due_clears_time() {
        let task = Task::new("t1", "Sample", Utc::now());
        let opts = EditOptions {
            no_due: true,
            project: Some("  ".to_string()),
            ..Default::default()
        };
        let update = build_update(&opts, &task, today()).unwrap();
        assert_eq!(update.due_date, Some(None));
        assert_eq!(update.due_time, Some(None));
        assert_eq!(update.project_id, Some(None));
    }

    #[test]
    fn test_build_update_empty() {
        let task = Task::new("t1", "Sample", Utc::now());
        let update = build_update(&EditOptions::default(), &task, today()).unwrap();
        assert!(update.is_empty());
    }

    #[tokio::test]
    async fn test_edit_plain_task() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let task = store.add_task(NewTask::new("Draft")).await.unwrap();

        let opts = EditOptions {
            task_id: task.id[..8].to_string(),
            content: Some("Final".to_string()),
            priority: Some(Priority::P1),
            due: Some("today".to_string()),
            ..Default::default()
        };
        let outcome = edit_task(&store, &opts, today()).await.unwrap();
        let EditOutcome::Updated(updated) = outcome else {
            panic!("expected Updated, got {outcome:?}");
        };
        assert_eq!(updated.content, "Final");
        assert_eq!(updated.priority, Some(Priority::P1));
        assert_eq!(updated.due_date, Some(today()));
    }

    #[tokio::test]
    async fn test_edit_without_fields_reports_no_changes() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let task = store.add_task(NewTask::new("Same")).await.unwrap();
        let opts = EditOptions {
            task_id: task.id.clone(),
            ..Default::default()
        };
        assert!(matches!(
            edit_task(&store, &opts, today()).await.unwrap(),
            EditOutcome::NoChanges(id) if id == task.id
        ));
    }

    #[tokio::test]
    async fn test_edit_single_instance() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let mut new_task = NewTask::new("Standup");
        new_task.recurrence = Some(RecurrencePattern::new(Frequency::Daily, date(2025, 3, 10)));
        let anchor = store.add_task(new_task).await.unwrap();

        let opts = EditOptions {
            task_id: anchor.id.clone(),
            content: Some("Standup (offsite)".to_string()),
            instance: Some("2025-03-14".to_string()),
            mode: Some(EditMode::Single),
            ..Default::default()
        };
        let outcome = edit_task(&store, &opts, today()).await.unwrap();
        let EditOutcome::Instance { date: when, change } = outcome else {
            panic!("expected Instance, got {outcome:?}");
        };
        assert_eq!(when, date(2025, 3, 14));
        let InstanceChange::Materialized { standalone, anchor } = change else {
            panic!("expected Materialized, got {change:?}");
        };
        assert_eq!(standalone.content, "Standup (offsite)");
        assert_eq!(standalone.due_date, Some(date(2025, 3, 14)));
        assert!(anchor.recurrence.unwrap().is_exception(date(2025, 3, 14)));
    }
}
