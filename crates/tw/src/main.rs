use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::{load_config, Config};
use commands::{CommandContext, CommandError};
use dispatch::{NoStoreCommand, NoStoreDispatch, StoreCommand, StoreDispatch};
use tickwise_store::StoreError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(error_exit_code(&e))
        }
    }
}

/// Sets up stderr logging. `TW_LOG` takes precedence over the verbosity flags.
fn init_logging(cli: &Cli) {
    let env_filter = EnvFilter::try_from_env("TW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

async fn run(cli: &Cli) -> commands::Result<()> {
    // Config, completions and help run without the database
    if let Some(dispatch) = NoStoreDispatch::try_from_cli(cli) {
        let config = load_config().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable configuration");
            Config::default()
        });
        let ctx = CommandContext::from_cli(cli, config);
        return dispatch.execute(&ctx).await;
    }

    let ctx = CommandContext::from_cli(cli, load_config()?);
    match StoreDispatch::from_cli(cli) {
        Some(dispatch) => {
            let store = commands::open_store(&ctx).await?;
            dispatch.execute(&ctx, &store).await
        }
        None => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Store(StoreError::NotFound { .. }) => "NOT_FOUND",
        CommandError::Store(StoreError::AmbiguousId { .. }) => "AMBIGUOUS_ID",
        CommandError::Store(StoreError::Duplicate { .. }) => "DUPLICATE",
        CommandError::Store(StoreError::InvalidPattern(_)) => "INVALID_RECURRENCE",
        CommandError::Store(StoreError::Database(_)) | CommandError::Database(_) => {
            "DATABASE_ERROR"
        }
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Model(_) | CommandError::InvalidArgument(_) => "INVALID_ARGUMENT",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process exit status for an error.
fn error_exit_code(e: &CommandError) -> u8 {
    match e {
        CommandError::Filter(_)
        | CommandError::Model(_)
        | CommandError::InvalidArgument(_)
        | CommandError::Json(_) => 1,
        CommandError::Store(StoreError::Database(_)) | CommandError::Database(_) => 5,
        CommandError::Store(_) => 4,
        CommandError::Io(_) => 3,
        CommandError::Config(_) => 5,
    }
}
