//! Show command implementation.
//!
//! Displays one task with its subtasks and, for recurring tasks, the next
//! few occurrences.

use chrono::NaiveDate;
use tickwise_model::models::Task;
use tickwise_store::{TaskStorage, TaskStore};

use super::{CommandContext, Result};
use crate::output::{format_task_details_json, format_task_details_table};

/// Options for the show command.
#[derive(Debug)]
pub struct ShowOptions {
    /// Task ID or prefix.
    pub task_id: String,
    /// Number of upcoming occurrences to list.
    pub occurrences: usize,
}

/// Everything the show command displays.
#[derive(Debug)]
pub struct ShowResult {
    pub task: Task,
    pub subtasks: Vec<Task>,
    /// Upcoming occurrence dates (recurring, open tasks only).
    pub upcoming: Vec<NaiveDate>,
}

/// Loads a task, its subtasks and its upcoming occurrences from `today`.
pub async fn show_task<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &ShowOptions,
    today: NaiveDate,
) -> Result<ShowResult> {
    let id = store.resolve_id(&opts.task_id).await?;
    let task = store.get_task(&id).await?;
    let subtasks = store.subtasks(&id).await?;

    let upcoming = if task.is_recurring() && !task.completed && opts.occurrences > 0 {
        store
            .upcoming_occurrences(&id, today, opts.occurrences)
            .await?
    } else {
        Vec::new()
    };

    Ok(ShowResult {
        task,
        subtasks,
        upcoming,
    })
}

/// Executes the show command.
///
/// # Errors
///
/// Returns an error if the task cannot be found or the id is ambiguous.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &ShowOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    let result = show_task(store, opts, ctx.today()).await?;

    if ctx.json_output {
        println!("{}", format_task_details_json(&result)?);
    } else if !ctx.quiet {
        print!("{}", format_task_details_table(&result, &ctx.display_options()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwise_model::models::{Frequency, NewTask, RecurrencePattern};
    use tickwise_store::LocalStorage;

    use crate::commands::CommandError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_show_recurring_with_subtasks() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let mut new_task = NewTask::new("Weekly review");
        new_task.recurrence = Some(RecurrencePattern::new(Frequency::Weekly, date(2025, 3, 3)));
        let parent = store.add_task(new_task).await.unwrap();

        let mut child = NewTask::new("Clear inbox");
        child.parent_task_id = Some(parent.id.clone());
        store.add_task(child).await.unwrap();

        let opts = ShowOptions {
            task_id: parent.id[..6].to_string(),
            occurrences: 3,
        };
        let result = show_task(&store, &opts, date(2025, 3, 12)).await.unwrap();

        assert_eq!(result.task.id, parent.id);
        assert_eq!(result.subtasks.len(), 1);
        assert_eq!(
            result.upcoming,
            vec![date(2025, 3, 17), date(2025, 3, 24), date(2025, 3, 31)]
        );
    }

    #[tokio::test]
    async fn test_show_plain_task_has_no_occurrences() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let task = store.add_task(NewTask::new("One-off")).await.unwrap();

        let opts = ShowOptions {
            task_id: task.id.clone(),
            occurrences: 5,
        };
        let result = show_task(&store, &opts, date(2025, 3, 12)).await.unwrap();
        assert!(result.upcoming.is_empty());
        assert!(result.subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_show_missing_task() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let opts = ShowOptions {
            task_id: "deadbeef".to_string(),
            occurrences: 5,
        };
        let err = show_task(&store, &opts, date(2025, 3, 12)).await.unwrap_err();
        assert!(matches!(err, CommandError::Store(ref e) if e.is_not_found()));
    }
}
