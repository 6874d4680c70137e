//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tw CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tickwise_model::models::{EditMode, Frequency, Priority};

/// tw - A local to-do list with recurring tasks and filter queries
#[derive(Parser, Debug)]
#[command(name = "tw")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Override the task database file (default: from config or data dir)
    #[arg(long, global = true, env = "TW_DATA")]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks
    #[command(alias = "l")]
    List {
        /// Filter query (e.g., "priority:p1 AND due:today")
        #[arg(short, long)]
        filter: Option<String>,

        /// Include completed tasks
        #[arg(long)]
        completed: bool,

        /// Limit results (default: 50)
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Show all matching tasks (no limit)
        #[arg(long)]
        all: bool,

        /// Sort by field
        #[arg(long, value_enum)]
        sort: Option<SortField>,

        /// Reverse sort order
        #[arg(long)]
        reverse: bool,
    },

    /// Add a new task
    #[command(alias = "a")]
    Add {
        /// Task content/title
        content: String,

        /// Priority level (p1=highest, p4=lowest)
        #[arg(short = 'P', long)]
        priority: Option<Priority>,

        /// Due date (today, tomorrow or YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,

        /// Due time (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Estimated duration in minutes
        #[arg(long)]
        duration: Option<u32>,

        /// Add label (repeatable)
        #[arg(short, long, action = clap::ArgAction::Append)]
        label: Vec<String>,

        /// Project ID
        #[arg(short, long)]
        project: Option<String>,

        /// Section ID
        #[arg(long)]
        section: Option<String>,

        /// Parent task ID (creates subtask)
        #[arg(long)]
        parent: Option<String>,

        /// Assign to user (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        assign: Vec<String>,

        /// Task description/notes
        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        recurrence: RecurrenceArgs,
    },

    /// Show task details
    #[command(alias = "s")]
    Show {
        /// Task ID or unique prefix
        task_id: String,

        /// Number of upcoming occurrences to show for recurring tasks
        #[arg(long, default_value = "5")]
        occurrences: usize,
    },

    /// Edit a task, or one occurrence of a recurring task
    #[command(alias = "e")]
    Edit {
        /// Task ID or unique prefix
        task_id: String,

        /// Update content
        #[arg(short, long)]
        content: Option<String>,

        /// Change priority
        #[arg(short = 'P', long)]
        priority: Option<Priority>,

        /// Change due date
        #[arg(short, long)]
        due: Option<String>,

        /// Remove due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,

        /// Change due time (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Set labels (replaces existing)
        #[arg(short, long, action = clap::ArgAction::Append)]
        label: Vec<String>,

        /// Add label
        #[arg(long)]
        add_label: Option<String>,

        /// Remove label
        #[arg(long)]
        remove_label: Option<String>,

        /// Move to project
        #[arg(short, long)]
        project: Option<String>,

        /// Update description
        #[arg(long)]
        description: Option<String>,

        /// Occurrence date to edit (recurring tasks)
        #[arg(long, requires = "mode")]
        instance: Option<String>,

        /// Which occurrences to change: single, future or all
        #[arg(long, requires = "instance")]
        mode: Option<EditMode>,
    },

    /// Complete task(s)
    #[command(alias = "d")]
    Done {
        /// Task ID(s)
        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Reopen completed task(s)
    Reopen {
        /// Task ID(s)
        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Delete a task, or one occurrence of a recurring task
    #[command(alias = "rm")]
    Delete {
        /// Task ID or unique prefix
        task_id: String,

        /// Occurrence date to delete (recurring tasks)
        #[arg(long, requires = "mode")]
        instance: Option<String>,

        /// Which occurrences to delete: single, future or all
        #[arg(long, requires = "instance")]
        mode: Option<EditMode>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Set or clear a task's recurrence
    Recur {
        /// Task ID or unique prefix
        task_id: String,

        #[command(flatten)]
        recurrence: RecurrenceArgs,

        /// Remove the recurrence
        #[arg(long, conflicts_with = "every")]
        clear: bool,
    },

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Recurrence flags shared by `add` and `recur`.
#[derive(Args, Debug, Clone, Default)]
pub struct RecurrenceArgs {
    /// Repeat daily, weekly, monthly, yearly or custom
    #[arg(long)]
    pub every: Option<Frequency>,

    /// Repeat every N units
    #[arg(long, default_value = "1", requires = "every")]
    pub interval: u32,

    /// Weekdays for custom recurrence (e.g., mon,wed,fri)
    #[arg(long, requires = "every")]
    pub on: Option<String>,

    /// First date of the series (default: due date or today)
    #[arg(long, requires = "every")]
    pub starting: Option<String>,

    /// Last date of the series
    #[arg(long, requires = "every")]
    pub until: Option<String>,
}

/// Sort fields for list command
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Due,
    Priority,
    Created,
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open config in $EDITOR
    Edit,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}
