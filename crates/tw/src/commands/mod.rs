//! Command implementations for the tw CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod add;
pub mod completions;
pub mod config;
pub mod delete;
pub mod done;
pub mod edit;
pub mod list;
pub mod recur;
pub mod reopen;
pub mod show;

use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveTime};
use tickwise_model::models::{parse_weekdays, RecurrencePattern};
use tickwise_model::error::ModelError;
use tickwise_store::filter::{FilterContext, FilterError};
use tickwise_store::{DatabaseFile, DatabaseFileError, LocalStorage, StoreError, TaskStore};

use crate::cli::{Cli, RecurrenceArgs};
use crate::output::DisplayOptions;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Task store error.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Database file error.
    #[error("database error: {0}")]
    Database(#[from] DatabaseFileError),

    /// Filter parsing error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// Invalid value for a model field.
    #[error("{0}")]
    Model(#[from] ModelError),

    /// Invalid command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Database file given on the command line or via `TW_DATA`.
    pub data_file: Option<PathBuf>,
    /// Loaded configuration.
    pub config: Config,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and configuration.
    pub fn from_cli(cli: &Cli, config: Config) -> Self {
        let use_colors = !cli.no_color
            && config.output.color.unwrap_or(true)
            && std::env::var_os("NO_COLOR").is_none();

        Self {
            json_output: cli.json,
            use_colors,
            quiet: cli.quiet,
            data_file: cli.data_file.clone(),
            config,
        }
    }

    /// Today's date on the local clock.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Builds the filter evaluation context from configuration.
    pub fn filter_context(&self) -> Result<FilterContext> {
        let mut context = FilterContext::new().with_week_start(self.config.week_start()?);
        if let Some(user) = &self.config.user {
            context = context.with_current_user(user.clone());
        }
        Ok(context)
    }

    /// Resolves the database file: flag/env, then config, then the data dir.
    pub fn database_file(&self) -> Result<DatabaseFile> {
        if let Some(path) = &self.data_file {
            return Ok(DatabaseFile::with_path(path));
        }
        if let Some(path) = &self.config.data_file {
            return Ok(DatabaseFile::with_path(path));
        }
        Ok(DatabaseFile::new()?)
    }

    /// Whether dates should be printed as ISO dates.
    pub fn iso_dates(&self) -> bool {
        self.config.output.date_format.as_deref() == Some("iso")
    }

    /// Display settings for table output.
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            today: self.today(),
            iso_dates: self.iso_dates(),
            use_colors: self.use_colors,
        }
    }
}

/// Opens the task store for the current context.
pub async fn open_store(ctx: &CommandContext) -> Result<TaskStore<LocalStorage>> {
    let file = ctx.database_file()?;
    tracing::debug!(path = %file.path().display(), "opening task database");
    let storage = LocalStorage::open(file).await?;
    Ok(TaskStore::new(storage))
}

/// Parses a date argument: `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today + chrono::Duration::days(1)),
        "yesterday" => Ok(today - chrono::Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            CommandError::InvalidArgument(format!(
                "invalid date '{input}' (expected today, tomorrow, yesterday or YYYY-MM-DD)"
            ))
        }),
    }
}

/// Parses a time argument in `HH:MM` form.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").map_err(|_| {
        CommandError::InvalidArgument(format!("invalid time '{input}' (expected HH:MM)"))
    })
}

/// Builds a recurrence pattern from CLI flags.
///
/// Returns `None` when `--every` was not given. The series starts on
/// `--starting`, else `default_start`.
pub fn recurrence_from_args(
    args: &RecurrenceArgs,
    default_start: NaiveDate,
    today: NaiveDate,
) -> Result<Option<RecurrencePattern>> {
    let Some(frequency) = args.every else {
        return Ok(None);
    };

    let start = match &args.starting {
        Some(s) => parse_date(s, today)?,
        None => default_start,
    };
    let mut pattern = RecurrencePattern::new(frequency, start).every(args.interval);
    if let Some(days) = &args.on {
        pattern = pattern.on(parse_weekdays(days)?);
    }
    if let Some(until) = &args.until {
        pattern = pattern.until(parse_date(until, today)?);
    }

    Ok(Some(pattern))
}

/// Asks for confirmation before a destructive action.
///
/// Returns true without asking when `force` is set, and false when stdin is
/// not a terminal.
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }

    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CommandError::Io(std::io::Error::other(e.to_string())))
}
