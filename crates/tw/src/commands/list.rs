//! List command implementation.
//!
//! Lists tasks with optional filter queries, sorting and limits.

use std::cmp::Ordering;

use tickwise_model::models::Task;
use tickwise_store::filter::{Filter, FilterContext, FilterEvaluator, FilterParser};
use tickwise_store::{TaskStorage, TaskStore};

use super::{CommandContext, Result};
use crate::cli::SortField;
use crate::output::{format_tasks_json, format_tasks_table};

/// Fields that make a query about completion state.
const STATUS_FIELDS: [&str; 4] = ["status", "state", "completed", "completeddate"];

/// Options for the list command.
#[derive(Debug)]
pub struct ListOptions {
    /// Filter query.
    pub filter: Option<String>,
    /// Include completed tasks.
    pub completed: bool,
    /// Maximum number of tasks shown.
    pub limit: usize,
    /// Ignore the limit.
    pub all: bool,
    /// Sort field.
    pub sort: Option<SortField>,
    /// Reverse the order.
    pub reverse: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            filter: None,
            completed: false,
            limit: 50,
            all: false,
            sort: None,
            reverse: false,
        }
    }
}

/// Tasks selected by a list query.
#[derive(Debug)]
pub struct ListResult {
    /// Tasks to show, after sorting and the limit.
    pub tasks: Vec<Task>,
    /// Number of matching tasks before the limit.
    pub total: usize,
}

/// Selects, sorts and limits tasks.
///
/// The filter is parsed strictly so typos are reported instead of silently
/// matching nothing. Completed tasks are hidden unless `--completed` is
/// given or the query itself asks about completion.
pub async fn list_tasks<S: TaskStorage>(
    store: &TaskStore<S>,
    opts: &ListOptions,
    context: &FilterContext,
) -> Result<ListResult> {
    let query = opts.filter.as_deref().unwrap_or("").trim();

    let mut show_completed = opts.completed;
    let mut tasks = store.list_tasks().await?;
    if !query.is_empty() {
        let filter = FilterParser::parse_strict(query)?;
        show_completed |= mentions_status(&filter);
        let evaluator = FilterEvaluator::new(&filter, context);
        tasks.retain(|task| evaluator.matches(task));
    }

    if !show_completed {
        tasks.retain(|task| !task.completed);
    }

    sort_tasks(&mut tasks, opts);

    let total = tasks.len();
    if !opts.all {
        tasks.truncate(opts.limit);
    }

    Ok(ListResult { tasks, total })
}

fn mentions_status(filter: &Filter) -> bool {
    filter
        .conditions()
        .iter()
        .any(|condition| STATUS_FIELDS.contains(&condition.field.as_str()))
}

fn sort_tasks(tasks: &mut [Task], opts: &ListOptions) {
    if let Some(sort_field) = opts.sort {
        match sort_field {
            SortField::Due => {
                tasks.sort_by(|a, b| {
                    none_last(a.due_date, b.due_date).then_with(|| a.due_time.cmp(&b.due_time))
                });
            }
            SortField::Priority => {
                tasks.sort_by(|a, b| none_last(a.priority, b.priority));
            }
            SortField::Created => {
                tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            }
        }
    }

    if opts.reverse {
        tasks.reverse();
    }
}

/// Orders `Some` values ascending with `None` after all of them.
fn none_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the filter query is malformed or the database cannot
/// be read.
pub async fn execute<S: TaskStorage>(
    ctx: &CommandContext,
    opts: &ListOptions,
    store: &TaskStore<S>,
) -> Result<()> {
    let context = ctx.filter_context()?;
    let result = list_tasks(store, opts, &context).await?;
    let tasks: Vec<&Task> = result.tasks.iter().collect();

    if ctx.json_output {
        println!("{}", format_tasks_json(&tasks, result.total)?);
    } else if !ctx.quiet {
        print!("{}", format_tasks_table(&tasks, &ctx.display_options()));
        if result.total > tasks.len() {
            println!(
                "({} of {} tasks shown; use --all to see everything)",
                tasks.len(),
                result.total
            );
        }
    }

    Ok(())
}
