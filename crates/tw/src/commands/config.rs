//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/tw/config.toml.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tickwise_model::models::parse_weekday;
use tokio::process::Command;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# tw configuration

# Config schema version (do not modify)
version = 1

# Your user name; `assigned:me` and `mycreated` filters match against it
# user = "alice"

# First day of the week for `due:thisweek`
# week_start = "monday"

# Task database location (can also use --data-file or TW_DATA)
# data_file = "/path/to/tasks.json"

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)
# date_format = "relative"  # "relative" or "iso"
"#;

/// Valid values for `output.date_format`.
const DATE_FORMATS: [&str; 2] = ["relative", "iso"];

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Current user, used by `assigned:me` and `mycreated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// First day of the week (weekday name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,

    /// Task database path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            user: None,
            week_start: None,
            data_file: None,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Returns the configured first day of the week, Monday when unset.
    pub fn week_start(&self) -> Result<Weekday> {
        match &self.week_start {
            Some(name) => Ok(parse_weekday(name)?),
            None => Ok(Weekday::Mon),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Date format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/tw/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("tw"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("tw"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("TW_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

/// Loads the configuration from a specific file, defaulting when missing.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        tracing::warn!(
            version = config.version,
            supported = CONFIG_VERSION,
            "config file is newer than this tw; unknown settings are ignored"
        );
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Saves the configuration to a specific file.
fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;
    let config = load_config_from(&path)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("Settings:");
            if let Some(ref user) = config.user {
                println!("  user: {}", user);
            }
            if let Some(ref week_start) = config.week_start {
                println!("  week_start: {}", week_start);
            }
            if let Some(ref data_file) = config.data_file {
                println!("  data_file: {}", data_file.display());
            }

            println!("\n[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }
            if let Some(ref format) = config.output.date_format {
                println!("  date_format: {}", format);
            }
        } else {
            println!("(No config file exists. Run 'tw config edit' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config edit command.
pub async fn execute_edit(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)
            .map_err(|e| CommandError::Config(format!("Failed to create config file: {}", e)))?;

        if !ctx.quiet && !ctx.json_output {
            eprintln!("Created default config at: {}", path.display());
        }
    }

    let editor = env::var("EDITOR")
        .or_else(|_| env::var("VISUAL"))
        .unwrap_or_else(|_| "vi".to_string());

    tracing::debug!(editor = %editor, path = %path.display(), "opening config in editor");

    // Open editor (async to avoid blocking the tokio runtime)
    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .await
        .map_err(|e| CommandError::Config(format!("Failed to open editor '{}': {}", editor, e)))?;

    // Re-read to catch syntax errors while the user is still looking
    if status.success() {
        load_config_from(&path)?;
    }

    if ctx.json_output {
        let output = serde_json::json!({
            "status": if status.success() { "success" } else { "error" },
            "editor": editor,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if status.success() {
            println!("Config saved.");
        } else {
            eprintln!("Editor exited with error");
        }
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Applies `key = value` to a config, validating the value.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let (section, field) = match key.split_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };

    match (section, field) {
        (None, "user") => {
            config.user = Some(value.to_string());
        }
        (None, "week_start") => {
            let day = parse_weekday(value)?;
            config.week_start = Some(weekday_name(day).to_string());
        }
        (None, "data_file") => {
            config.data_file = Some(PathBuf::from(value));
        }
        (Some("output"), "color") => {
            config.output.color = Some(parse_bool(value)?);
        }
        (Some("output"), "date_format") => {
            if !DATE_FORMATS.contains(&value) {
                return Err(CommandError::Config(format!(
                    "Invalid date_format value '{}'. Valid values: {}",
                    value,
                    DATE_FORMATS.join(", ")
                )));
            }
            config.output.date_format = Some(value.to_string());
        }
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: user, week_start, data_file, output.color, output.date_format",
                key
            )));
        }
    }

    Ok(())
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let path = get_config_path()?;
    let mut config = load_config_from(&path)?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config_to(&config, &path)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_bool_true_values() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("yes").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(parse_bool("on").unwrap());
    }

    #[test]
    fn test_parse_bool_false_values() {
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("False").unwrap());
        assert!(!parse_bool("no").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("off").unwrap());
    }

    #[test]
    fn test_parse_bool_invalid() {
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.user.is_none());
        assert!(config.data_file.is_none());
        assert_eq!(config.week_start().unwrap(), Weekday::Mon);
    }

    #[test]
    fn test_default_config_week_filter_is_understood() {
        use tickwise_model::models::Task;
        use tickwise_store::filter::{parse_and_evaluate, FilterContext};

        let query = DEFAULT_CONFIG
            .split('`')
            .find(|part| part.starts_with("due:"))
            .unwrap();
        let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let context = FilterContext::new().with_today(today);
        let mut task = Task::new("t1", "Review", chrono::Utc::now());
        task.due_date = Some(today);

        assert_eq!(query, "due:thisweek");
        assert!(parse_and_evaluate(query, &task, &context));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1
user = "alice"
week_start = "sunday"
data_file = "/tmp/tasks.json"

[output]
color = false
date_format = "iso"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.week_start().unwrap(), Weekday::Sun);
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/tasks.json")));
        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.output.date_format.as_deref(), Some("iso"));
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        // Missing version defaults to current version
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_week_start() {
        let config = Config {
            week_start: Some("caturday".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.week_start(), Err(CommandError::Model(_))));
    }

    #[test]
    fn test_migrate_config_future_version() {
        let config = Config {
            version: 999,
            user: Some("bob".to_string()),
            ..Default::default()
        };
        let migrated = migrate_config(config).unwrap();
        assert_eq!(migrated.version, CONFIG_VERSION);
        assert_eq!(migrated.user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_load_config_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "user = [").unwrap();
        assert!(matches!(load_config_from(&path), Err(CommandError::Config(_))));
    }

    #[test]
    fn test_apply_setting_and_save_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();

        apply_setting(&mut config, "user", "alice").unwrap();
        apply_setting(&mut config, "week_start", "Sun").unwrap();
        apply_setting(&mut config, "output.color", "off").unwrap();
        apply_setting(&mut config, "output.date_format", "iso").unwrap();
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.user.as_deref(), Some("alice"));
        assert_eq!(loaded.week_start.as_deref(), Some("sunday"));
        assert_eq!(loaded.output.color, Some(false));
        assert_eq!(loaded.output.date_format.as_deref(), Some("iso"));
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply_setting(&mut config, "output.date_format", "short").is_err());
        assert!(apply_setting(&mut config, "week_start", "someday").is_err());
        assert!(apply_setting(&mut config, "token", "abc").is_err());
        assert_eq!(config, Config::default());
    }
}
