//! Recur command implementation.
//!
//! Attaches a recurrence to an existing task, or removes it.

use tickwise_model::models::Task;
use tickwise_store::recurrence::{describe, validate_pattern};
use tickwise_store::{StoreError, TaskStorage, TaskStore};

use super::{recurrence_from_args, CommandContext, CommandError, Result};
use crate::cli::RecurrenceArgs;
use crate::output::format_task_json;
use crate::output::helpers::truncate_id;

/// Options for the recur command.
#[derive(Debug, Default)]
pub struct RecurOptions {
    /// Task ID or prefix.
    pub task_id: String,
    /// Recurrence flags.
    pub recurrence: RecurrenceArgs,
    /// Remove the recurrence instead.
    pub clear: bool,
}

/// Sets or clears the recurrence and returns the updated task.
///
/// A new series starts on the task's due date, or `today` if it has none.
pub async fn set_recurrence<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &RecurOptions,
    today: chrono::NaiveDate,
) -> Result<Task> {
    let id = store.resolve_id(&opts.task_id).await?;

    if opts.clear {
        return Ok(store.remove_recurrence(&id).await?);
    }

    let task = store.get_task(&id).await?;
    let start = task.due_date.unwrap_or(today);
    let pattern = recurrence_from_args(&opts.recurrence, start, today)?.ok_or_else(|| {
        CommandError::InvalidArgument("either --every or --clear is required".to_string())
    })?;

    // add_recurrence only reports a bool, so surface the reason first
    validate_pattern(&pattern).map_err(StoreError::from)?;
    if !store.add_recurrence(&id, pattern).await? {
        return Err(CommandError::InvalidArgument(
            "recurrence pattern was rejected".to_string(),
        ));
    }

    Ok(store.get_task(&id).await?)
}

/// Executes the recur command.
///
/// # Errors
///
/// Returns an error if the task cannot be found, the pattern is invalid, or
/// the database cannot be written.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &RecurOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    let task = set_recurrence(store, opts, ctx.today()).await?;

    if ctx.json_output {
        println!("{}", format_task_json(&task)?);
    } else if !ctx.quiet {
        match task.recurrence {
            Some(ref pattern) => println!(
                "{} ({}) now repeats {}",
                task.content,
                truncate_id(&task.id),
                describe(pattern)
            ),
            None => println!(
                "{} ({}) no longer repeats",
                task.content,
                truncate_id(&task.id)
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tickwise_model::models::{Frequency, NewTask};
    use tickwise_store::LocalStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn every(frequency: Frequency) -> RecurrenceArgs {
        RecurrenceArgs {
            every: Some(frequency),
            interval: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_recur_starts_on_due_date() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let mut new_task = NewTask::new("Pay rent");
        new_task.due_date = Some(date(2025, 3, 31));
        let task = store.add_task(new_task).await.unwrap();

        let opts = RecurOptions {
            task_id: task.id.clone(),
            recurrence: every(Frequency::Monthly),
            clear: false,
        };
        let updated = set_recurrence(&store, &opts, date(2025, 3, 12)).await.unwrap();
        let pattern = updated.recurrence.unwrap();
        assert_eq!(pattern.start_date, date(2025, 3, 31));
        assert_eq!(updated.due_date, Some(date(2025, 3, 31)));
    }

    #[tokio::test]
    async fn test_recur_without_due_gets_first_occurrence() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let task = store.add_task(NewTask::new("Journal")).await.unwrap();

        let opts = RecurOptions {
            task_id: task.id.clone(),
            recurrence: every(Frequency::Daily),
            clear: false,
        };
        let updated = set_recurrence(&store, &opts, date(2025, 3, 12)).await.unwrap();
        assert_eq!(updated.due_date, Some(date(2025, 3, 12)));
    }

    #[tokio::test]
    async fn test_recur_invalid_pattern_leaves_task() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let task = store.add_task(NewTask::new("Yoga")).await.unwrap();

        let opts = RecurOptions {
            task_id: task.id.clone(),
            recurrence: every(Frequency::Custom),
            clear: false,
        };
        let err = set_recurrence(&store, &opts, date(2025, 3, 12)).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Store(StoreError::InvalidPattern(_))
        ));
        assert!(store.get_task(&task.id).await.unwrap().recurrence.is_none());
    }

    #[tokio::test]
    async fn test_recur_clear_and_missing_flags() {
        let store = TaskStore::new(LocalStorage::in_memory());
        let task = store.add_task(NewTask::new("Water cactus")).await.unwrap();
        let today = date(2025, 3, 12);

        let set = RecurOptions {
            task_id: task.id.clone(),
            recurrence: every(Frequency::Weekly),
            clear: false,
        };
        set_recurrence(&store, &set, today).await.unwrap();

        let clear = RecurOptions {
            task_id: task.id.clone(),
            clear: true,
            ..Default::default()
        };
        let cleared = set_recurrence(&store, &clear, today).await.unwrap();
        assert!(cleared.recurrence.is_none());
        assert!(cleared.due_date.is_some());

        let neither = RecurOptions {
            task_id: task.id.clone(),
            ..Default::default()
        };
        assert!(matches!(
            set_recurrence(&store, &neither, today).await,
            Err(CommandError::InvalidArgument(_))
        ));
    }
}
