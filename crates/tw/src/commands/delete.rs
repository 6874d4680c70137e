//! Delete command implementation.
//!
//! Deletes a task with its subtasks, or occurrences of a recurring task.

use chrono::NaiveDate;
use tickwise_model::models::EditMode;
use tickwise_store::{InstanceChange, TaskStorage, TaskStore};

use super::{confirm, parse_date, CommandContext, Result};
use crate::output::helpers::truncate_id;
use crate::output::{format_instance_change, format_instance_change_json};

/// Options for the delete command.
#[derive(Debug, Default)]
pub struct DeleteOptions {
    /// Task ID or prefix.
    pub task_id: String,
    /// Occurrence date for instance deletes.
    pub instance: Option<String>,
    /// Which occurrences to delete.
    pub mode: Option<EditMode>,
    /// Skip confirmation prompt.
    pub force: bool,
}

/// What a delete did.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The user declined the prompt.
    Aborted,
    /// The task and these subtasks were deleted.
    Deleted {
        content: String,
        ids: Vec<String>,
    },
    /// Occurrences of a recurring task were removed.
    Instance {
        date: NaiveDate,
        change: InstanceChange,
    },
}

fn prompt(content: &str, instance: Option<(NaiveDate, EditMode)>) -> String {
    match instance {
        Some((date, EditMode::Single)) => format!("Skip the {} occurrence of '{}'?", date, content),
        Some((date, EditMode::Future)) => {
            format!("Delete '{}' from {} onwards?", content, date)
        }
        Some((_, EditMode::All)) | None => format!("Delete '{}'?", content),
    }
}

/// Deletes what `opts` describes, asking first unless `opts.force`.
pub async fn delete_task<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &DeleteOptions,
    today: NaiveDate,
) -> Result<DeleteOutcome> {
    let id = store.resolve_id(&opts.task_id).await?;
    let task = store.get_task(&id).await?;

    let instance = match (&opts.instance, opts.mode) {
        (Some(instance), Some(mode)) => Some((parse_date(instance, today)?, mode)),
        _ => None,
    };

    if !confirm(&prompt(&task.content, instance), opts.force)? {
        return Ok(DeleteOutcome::Aborted);
    }

    match instance {
        Some((date, mode)) => {
            let change = store.delete_recurring_instance(&id, date, mode).await?;
            Ok(DeleteOutcome::Instance { date, change })
        }
        None => {
            let ids = store.delete_task(&id).await?;
            Ok(DeleteOutcome::Deleted {
                content: task.content,
                ids,
            })
        }
    }
}

/// Executes the delete command.
///
/// # Errors
///
/// Returns an error if the task cannot be found, the instance date is
/// malformed, or the database cannot be written.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &DeleteOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    match delete_task(store, opts, ctx.today()).await? {
        DeleteOutcome::Aborted => {
            if !ctx.quiet {
                eprintln!("Aborted. Use --force to delete without a prompt.");
            }
        }
        DeleteOutcome::Deleted { content, ids } => {
            if ctx.json_output {
                let output = serde_json::json!({
                    "status": "success",
                    "deleted": ids,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if !ctx.quiet {
                let subtasks = ids.len().saturating_sub(1);
                let id = ids.first().map(|id| truncate_id(id)).unwrap_or_default();
                if subtasks > 0 {
                    println!("Deleted: {} ({}) and {} subtask(s)", content, id, subtasks);
                } else {
                    println!("Deleted: {} ({})", content, id);
                }
            }
        }
        DeleteOutcome::Instance { date, change } => {
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
    use tickwise_model::models::{Frequency, NewTask, RecurrencePattern};
    use tickwise_store::LocalStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn weekly_store() -> (TaskStore<LocalStorage>, String) {
        let store = TaskStore::new(LocalStorage::in_memory());
        let mut new_task = NewTask::new("Piano lesson");
        new_task.recurrence = Some(RecurrencePattern::new(Frequency::Weekly, date(2025, 3, 3)));
        let id = store.add_task(new_task).await.unwrap().id;
        (store, id)
    }

    #[test]
    fn test_prompt_wording() {
        assert_eq!(prompt("Gym", None), "Delete 'Gym'?");
        assert_eq!(
            prompt("Gym", Some((date(2025, 3, 10), EditMode::Future))),
            "Delete 'Gym' from 2025-03-10 onwards?"
        );
    }

    #[tokio::test]
    async fn test_delete_with_subtasks() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let parent = store.add_task(NewTask::new("Move house")).await.unwrap();
        let mut child = NewTask::new("Pack books");
        child.parent_task_id = Some(parent.id.clone());
        store.add_task(child).await.unwrap();

        let opts = DeleteOptions {
            task_id: parent.id.clone(),
            force: true,
            ..Default::default()
        };
        let outcome = delete_task(&store, &opts, date(2025, 3, 12)).await.unwrap();
        let DeleteOutcome::Deleted { ids, .. } = outcome else {
            panic!("expected Deleted, got {outcome:?}");
        };
        assert_eq!(ids.len(), 2);
        assert!(store.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_single_instance_adds_exception() {
        let (store, id) = weekly_store().await;
        let opts = DeleteOptions {
            task_id: id.clone(),
            instance: Some("2025-03-10".to_string()),
            mode: Some(EditMode::Single),
            force: true,
        };

        let outcome = delete_task(&store, &opts, date(2025, 3, 12)).await.unwrap();
        assert!(matches!(
            outcome,
            DeleteOutcome::Instance {
                change: InstanceChange::ExceptionAdded(_),
                ..
            }
        ));
        let pattern = store.get_task(&id).await.unwrap().recurrence.unwrap();
        assert!(pattern.is_exception(date(2025, 3, 10)));
    }

    #[tokio::test]
    async fn test_delete_future_truncates() {
        let (store, id) = weekly_store().await;
        let opts = DeleteOptions {
            task_id: id.clone(),
            instance: Some("2025-03-17".to_string()),
            mode: Some(EditMode::Future),
            force: true,
        };

        delete_task(&store, &opts, date(2025, 3, 12)).await.unwrap();
        let pattern = store.get_task(&id).await.unwrap().recurrence.unwrap();
        assert_eq!(pattern.end_date, Some(date(2025, 3, 16)));
    }
}
