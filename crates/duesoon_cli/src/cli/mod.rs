use clap::{Parser, Subcommand};
use duesoon_core::config::{ConfigOverrides, canonicalize_key};
use duesoon_core::error::AppError;
use duesoon_core::model::{Priority, TaskId};
use duesoon_core::organize::SortMode;

#[derive(Parser, Debug)]
#[command(name = "duesoon", author, version, about, long_about = None)]
pub struct Cli {
    /// Run one command; omit to start an interactive session with due-soon alarms
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: duesoon add "Submit report" --category Work --due "2025-12-20 17:00" --priority high
    Add {
        text: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Due date: RFC3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (local time)
        #[arg(short, long, value_name = "WHEN")]
        due: Option<String>,
        /// high, medium, low (or 1-3)
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },
    /// Mark a task completed, or reopen a completed one
    ///
    /// Example: duesoon toggle 1734652800000
    Toggle { id: TaskId },
    /// Delete a task
    ///
    /// Example: duesoon delete 1734652800000
    Delete { id: TaskId },
    /// Edit a task; fields not given keep their current value
    ///
    /// Example: duesoon edit 1734652800000 --text "Submit final report" --clear-due
    Edit {
        id: TaskId,
        #[arg(long)]
        text: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_name = "WHEN", conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// List active tasks grouped by category
    ///
    /// Example: duesoon list --sort due-date
    List {
        /// creation (newest first) or due-date (soonest first)
        #[arg(long)]
        sort: Option<SortMode>,
    },
    /// List completed tasks, most recently completed first
    History,
    /// Delete every completed task
    ClearHistory,
    /// Run one due-soon check now
    Check,
    /// Dismiss the alarm currently shown
    Dismiss,
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Name,
    SortBy,
    CheckInterval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_key(key_raw);
    if key.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "name" | "user_name" => ConfigOverrideTarget::Name,
        "sort" | "sort_by" => ConfigOverrideTarget::SortBy,
        "check_interval" | "check_interval_secs" => ConfigOverrideTarget::CheckInterval,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `--config-override` value into one set of overrides; later wins.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Name => overrides.name = Some(parsed.value),
            ConfigOverrideTarget::SortBy => {
                let mode = parsed
                    .value
                    .parse::<SortMode>()
                    .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
                overrides.sort_by = Some(mode);
            }
            ConfigOverrideTarget::CheckInterval => {
                let secs = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input(format!(
                        "{CONFIG_OVERRIDE_FLAG}: check_interval must be a whole number of seconds"
                    ))
                })?;
                overrides.check_interval_secs = Some(secs);
            }
        }
    }

    Ok(overrides)
}
