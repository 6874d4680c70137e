//! Reopen command implementation.
//!
//! Marks completed task(s) as active again.

use tickwise_model::models::Task;
use tickwise_store::{TaskStorage, TaskStore};

use super::{CommandContext, Result};
use crate::output::helpers::truncate_id;

/// Options for the reopen command.
#[derive(Debug)]
pub struct ReopenOptions {
    /// Task IDs (full IDs or prefixes).
    pub task_ids: Vec<String>,
}

/// Reopens every task in `opts`, resolving all ids first.
pub async fn reopen_tasks<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &ReopenOptions,
) -> Result<Vec<Task>> {
    let mut ids = Vec::with_capacity(opts.task_ids.len());
    for task_id in &opts.task_ids {
        ids.push(store.resolve_id(task_id).await?);
    }

    let mut reopened = Vec::with_capacity(ids.len());
    for id in ids {
        reopened.push(store.reopen_task(&id).await?);
    }
    Ok(reopened)
}

/// Executes the reopen command.
///
/// # Errors
///
/// Returns an error if a task cannot be found or the database cannot be
/// written.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &ReopenOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    let tasks = reopen_tasks(store, opts).await?;

    if ctx.json_output {
        let output: Vec<_> = tasks
            .iter()
            .map(|task| serde_json::json!({ "id": task.id, "content": task.content }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        for task in &tasks {
            println!("Reopened: {} ({})", task.content, truncate_id(&task.id));
        }
    }

    Ok(())
}
