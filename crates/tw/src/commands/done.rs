//! Done command implementation.
//!
//! Completes task(s). Completing a recurring task closes the current
//! occurrence and creates the next one.

use tickwise_store::{CompletionResult, TaskStorage, TaskStore};

use super::{CommandContext, Result};
use crate::output::{format_done_results_json, format_done_results_table};

/// Options for the done command.
#[derive(Debug)]
pub struct DoneOptions {
    /// Task IDs (full IDs or prefixes).
    pub task_ids: Vec<String>,
}

/// Result of completing a single task.
#[derive(Debug)]
pub struct DoneResult {
    /// The resolved task ID.
    pub id: String,
    /// The task content.
    pub content: String,
    /// What the store did.
    pub outcome: CompletionResult,
}

/// Completes every task in `opts`.
///
/// All ids are resolved before anything is written, so a typo in the last
/// id leaves the first ones untouched.
pub async fn complete_tasks<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &DoneOptions,
) -> Result<Vec<DoneResult>> {
    let mut resolved = Vec::with_capacity(opts.task_ids.len());
    for task_id in &opts.task_ids {
        let id = store.resolve_id(task_id).await?;
        let content = store.get_task(&id).await?.content;
        resolved.push((id, content));
    }

    let mut results = Vec::with_capacity(resolved.len());
    for (id, content) in resolved {
        let outcome = store.complete_task(&id).await?;
        results.push(DoneResult {
            id,
            content,
            outcome,
        });
    }

    Ok(results)
}

/// Executes the done command.
///
/// # Errors
///
/// Returns an error if a task cannot be found or the database cannot be
/// written.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &DoneOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    let results = complete_tasks(store, opts).await?;

    if ctx.json_output {
        println!("{}", format_done_results_json(&results)?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_done_results_table(&results, &ctx.display_options())
        );
    }

    Ok(())
}
