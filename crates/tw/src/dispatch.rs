//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands split into those that never touch the task database (config,
//! completions, help) and those that run against an open [`TaskStore`].

use tickwise_store::{TaskStorage, TaskStore};

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::{
    self, add::AddOptions, delete::DeleteOptions, done::DoneOptions, edit::EditOptions,
    list::ListOptions, recur::RecurOptions, reopen::ReopenOptions, show::ShowOptions,
    CommandContext, CommandError, Result,
};

/// Trait for commands that run without the task database.
#[allow(async_fn_in_trait)]
pub trait NoStoreCommand {
    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that operate on the task database.
#[allow(async_fn_in_trait)]
pub trait StoreCommand {
    /// Execute the command against the given store.
    async fn execute<S: TaskStorage>(
        &self,
        ctx: &CommandContext,
        store: &TaskStore<S>,
    ) -> Result<()>;
}

/// Commands that don't need the task database.
#[derive(Debug)]
pub enum NoStoreDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> NoStoreDispatch<'a> {
    /// Try to create a no-store dispatch from the CLI command.
    /// Returns None if the command needs the task database.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl NoStoreCommand for NoStoreDispatch<'_> {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command).await,
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("tw - local tasks with recurrence and filters");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
async fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Edit) => commands::config::execute_edit(ctx).await,
    }
}

/// Commands that operate on the task database.
#[derive(Debug)]
pub enum StoreDispatch {
    List(ListOptions),
    Add(AddOptions),
    Show(ShowOptions),
    Edit(EditOptions),
    Done(DoneOptions),
    Reopen(ReopenOptions),
    Delete(DeleteOptions),
    Recur(RecurOptions),
}

impl StoreDispatch {
    /// Create a store dispatch from the CLI command.
    /// Returns None if the command doesn't use the task database.
    pub fn from_cli(cli: &Cli) -> Option<Self> {
        let dispatch = match cli.command.as_ref()? {
            Commands::List {
                filter,
                completed,
                limit,
                all,
                sort,
                reverse,
            } => Self::List(ListOptions {
                filter: filter.clone(),
                completed: *completed,
                limit: *limit,
                all: *all,
                sort: *sort,
                reverse: *reverse,
            }),

            Commands::Add {
                content,
                priority,
                due,
                time,
                duration,
                label,
                project,
                section,
                parent,
                assign,
                description,
                recurrence,
            } => Self::Add(AddOptions {
                content: content.clone(),
                priority: *priority,
                due: due.clone(),
                time: time.clone(),
                duration: *duration,
                labels: label.clone(),
                project: project.clone(),
                section: section.clone(),
                parent: parent.clone(),
                assignees: assign.clone(),
                description: description.clone(),
                recurrence: recurrence.clone(),
            }),

            Commands::Show {
                task_id,
                occurrences,
            } => Self::Show(ShowOptions {
                task_id: task_id.clone(),
                occurrences: *occurrences,
            }),

            Commands::Edit {
                task_id,
                content,
                priority,
                due,
                no_due,
                time,
                label,
                add_label,
                remove_label,
                project,
                description,
                instance,
                mode,
            } => Self::Edit(EditOptions {
                task_id: task_id.clone(),
                content: content.clone(),
                priority: *priority,
                due: due.clone(),
                no_due: *no_due,
                time: time.clone(),
                labels: label.clone(),
                add_label: add_label.clone(),
                remove_label: remove_label.clone(),
                project: project.clone(),
                description: description.clone(),
                instance: instance.clone(),
                mode: *mode,
            }),

            Commands::Done { task_ids } => Self::Done(DoneOptions {
                task_ids: task_ids.clone(),
            }),

            Commands::Reopen { task_ids } => Self::Reopen(ReopenOptions {
                task_ids: task_ids.clone(),
            }),

            Commands::Delete {
                task_id,
                instance,
                mode,
                force,
            } => Self::Delete(DeleteOptions {
                task_id: task_id.clone(),
                instance: instance.clone(),
                mode: *mode,
                force: *force,
            }),

            Commands::Recur {
                task_id,
                recurrence,
                clear,
            } => Self::Recur(RecurOptions {
                task_id: task_id.clone(),
                recurrence: recurrence.clone(),
                clear: *clear,
            }),

            Commands::Config { .. } | Commands::Completions { .. } => return None,
        };

        Some(dispatch)
    }
}

impl StoreCommand for StoreDispatch {
    async fn execute<S: TaskStorage>(
        &self,
        ctx: &CommandContext,
        store: &TaskStore<S>,
    ) -> Result<()> {
        match self {
            Self::List(opts) => commands::list::execute(ctx, opts, store).await,
            Self::Add(opts) => commands::add::execute(ctx, opts, store).await,
            Self::Show(opts) => commands::show::execute(ctx, opts, store).await,
            Self::Edit(opts) => commands::edit::execute(ctx, opts, store).await,
            Self::Done(opts) => commands::done::execute(ctx, opts, store).await,
            Self::Reopen(opts) => commands::reopen::execute(ctx, opts, store).await,
            Self::Delete(opts) => commands::delete::execute(ctx, opts, store).await,
            Self::Recur(opts) => commands::recur::execute(ctx, opts, store).await,
        }
    }
}
