//! Add command implementation.
//!
//! Creates a new task, optionally recurring.

use chrono::NaiveDate;
use tickwise_model::models::{NewTask, Priority, Task};
use tickwise_store::recurrence::describe;
use tickwise_store::{TaskStorage, TaskStore};

use super::{parse_date, parse_time, recurrence_from_args, CommandContext, CommandError, Result};
use crate::cli::RecurrenceArgs;
use crate::output::format_task_json;
use crate::output::helpers::truncate_id;

/// Options for the add command.
#[derive(Debug, Default)]
pub struct AddOptions {
    /// Task content/title.
    pub content: String,
    /// Priority level.
    pub priority: Option<Priority>,
    /// Due date (`today`, `tomorrow` or ISO).
    pub due: Option<String>,
    /// Due time (`HH:MM`).
    pub time: Option<String>,
    /// Estimated duration in minutes.
    pub duration: Option<u32>,
    /// Labels to attach.
    pub labels: Vec<String>,
    /// Project ID.
    pub project: Option<String>,
    /// Section ID.
    pub section: Option<String>,
    /// Parent task ID or prefix (creates subtask).
    pub parent: Option<String>,
    /// Assignees.
    pub assignees: Vec<String>,
    /// Task description/notes.
    pub description: Option<String>,
    /// Recurrence flags.
    pub recurrence: RecurrenceArgs,
}

/// Creates the task described by `opts`.
///
/// `user` becomes the task's creator. The recurrence starts on the due date
/// unless `--starting` says otherwise.
pub async fn add_task<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &AddOptions,
    user: Option<&str>,
    today: NaiveDate,
) -> Result<Task> {
    let content = opts.content.trim();
    if content.is_empty() {
        return Err(CommandError::InvalidArgument(
            "task content cannot be empty".to_string(),
        ));
    }

    let due_date = opts
        .due
        .as_deref()
        .map(|due| parse_date(due, today))
        .transpose()?;
    let due_time = opts.time.as_deref().map(parse_time).transpose()?;
    if due_time.is_some() && due_date.is_none() {
        return Err(CommandError::InvalidArgument(
            "--time requires --due".to_string(),
        ));
    }

    let parent_task_id = match &opts.parent {
        Some(parent) => Some(store.resolve_id(parent).await?),
        None => None,
    };

    let mut new_task = NewTask::new(content);
    new_task.priority = opts.priority;
    new_task.due_date = due_date;
    new_task.due_time = due_time;
    new_task.duration_minutes = opts.duration;
    new_task.labels = opts.labels.iter().cloned().collect();
    new_task.project_id = opts.project.clone();
    new_task.section_id = opts.section.clone();
    new_task.parent_task_id = parent_task_id;
    new_task.assignees = opts.assignees.clone();
    new_task.description = opts.description.clone();
    new_task.created_by = user.map(str::to_string);
    new_task.recurrence =
        recurrence_from_args(&opts.recurrence, due_date.unwrap_or(today), today)?;

    Ok(store.add_task(new_task).await?)
}

/// Executes the add command.
///
/// # Errors
///
/// Returns an error if an argument is malformed, the parent does not exist,
/// the recurrence is invalid, or the database cannot be written.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &AddOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    let task = add_task(store, opts, ctx.config.user.as_deref(), ctx.today()).await?;

    if ctx.json_output {
        println!("{}", format_task_json(&task)?);
    } else if !ctx.quiet {
        let mut line = format!("Created task: {} ({})", task.content, truncate_id(&task.id));
        if let Some(ref pattern) = task.recurrence {
            line.push_str(&format!(", repeats {}", describe(pattern)));
        }
        println!("{}", line);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwise_model::models::Frequency;
    use tickwise_store::LocalStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> TaskStore<LocalStorage> {
        TaskStore::new(LocalStorage::in_memory())
    }

    #[tokio::test]
    async fn test_add_plain_task() {
        let store = store();
        let opts = AddOptions {
            content: "  Buy milk ".to_string(),
            priority: Some(Priority::P3),
            due: Some("tomorrow".to_string()),
            labels: vec!["errand".to_string()],
            ..Default::default()
        };

        let task = add_task(&store, &opts, Some("alice"), date(2025, 3, 12))
            .await
            .unwrap();

        assert_eq!(task.content, "Buy milk");
        assert_eq!(task.priority, Some(Priority::P3));
        assert_eq!(task.due_date, Some(date(2025, 3, 13)));
        assert!(task.has_label("errand"));
        assert_eq!(task.created_by.as_deref(), Some("alice"));
        assert!(task.recurrence.is_none());
    }

    #[tokio::test]
    async fn test_add_recurring_defaults_start_to_due() {
        let store = store();
        let opts = AddOptions {
            content: "Gym".to_string(),
            due: Some("2025-03-14".to_string()),
            recurrence: RecurrenceArgs {
                every: Some(Frequency::Weekly),
                interval: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        let task = add_task(&store, &opts, None, date(2025, 3, 12)).await.unwrap();
        let pattern = task.recurrence.unwrap();
        assert_eq!(pattern.start_date, date(2025, 3, 14));
        assert_eq!(task.due_date, Some(date(2025, 3, 14)));
    }

    #[tokio::test]
    async fn test_add_recurring_without_due_uses_first_occurrence() {
        let store = store();
        let opts = AddOptions {
            content: "Team sync".to_string(),
            recurrence: RecurrenceArgs {
                every: Some(Frequency::Custom),
                interval: 1,
                on: Some("fri".to_string()),
                starting: Some("2025-03-10".to_string()),
                until: None,
            },
            ..Default::default()
        };

        let task = add_task(&store, &opts, None, date(2025, 3, 12)).await.unwrap();
        assert_eq!(task.due_date, Some(date(2025, 3, 14)));
    }

    #[tokio::test]
    async fn test_add_subtask_by_prefix() {
        let store = store();
        let parent = add_task(
            &store,
            &AddOptions {
                content: "Plan trip".to_string(),
                ..Default::default()
            },
            None,
            date(2025, 3, 12),
        )
        .await
        .unwrap();

        let opts = AddOptions {
            content: "Book hotel".to_string(),
            parent: Some(parent.id[..8].to_string()),
            ..Default::default()
        };
        let child = add_task(&store, &opts, None, date(2025, 3, 12)).await.unwrap();
        assert_eq!(child.parent_task_id, Some(parent.id));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let store = store();
        let today = date(2025, 3, 12);

        let empty = AddOptions {
            content: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            add_task(&store, &empty, None, today).await,
            Err(CommandError::InvalidArgument(_))
        ));

        let time_only = AddOptions {
            content: "Call".to_string(),
            time: Some("10:00".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            add_task(&store, &time_only, None, today).await,
            Err(CommandError::InvalidArgument(_))
        ));

        let zero_interval = AddOptions {
            content: "Never".to_string(),
            recurrence: RecurrenceArgs {
                every: Some(Frequency::Daily),
                interval: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            add_task(&store, &zero_interval, None, today).await,
            Err(CommandError::Store(_))
        ));

        assert!(store.list_tasks().await.unwrap().is_empty());
    }
}
