use crate::cli::{Cli, Command, collect_config_overrides};
use crate::render;
use duesoon_core::clock::Clock;
use duesoon_core::config::{Config, merge_overrides};
use duesoon_core::error::AppError;
use duesoon_core::model::timestamp::{local_offset, parse_timestamp};
use duesoon_core::model::{Task, TaskFields};
use duesoon_core::notify::Notifier;
use duesoon_core::storage::KeyValueStore;
use duesoon_core::task_api::TaskApi;
use time::OffsetDateTime;

/// Effective configuration and output mode for one command.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config: Config,
    pub json: bool,
}

impl Settings {
    pub fn from_cli(base: &Config, cli: &Cli) -> Result<Self, AppError> {
        let overrides = collect_config_overrides(&cli.config_override)?;
        Ok(Self {
            config: merge_overrides(base, &overrides),
            json: cli.json,
        })
    }
}

pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn required_text(text: Option<String>) -> Result<String, AppError> {
    match text {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::invalid_input("text is required")),
    }
}

fn parse_due(raw: &str) -> Result<OffsetDateTime, AppError> {
    parse_timestamp(raw, local_offset())
}

fn print_task(settings: &Settings, verb: &str, task: &Task) {
    if settings.json {
        println!("{}", render::task_json(task));
    } else {
        println!("{verb} task: {} ({})", task.text, task.id);
    }
}

/// Shows a freshly raised alarm and hands it to the desktop notifier.
pub fn announce_alarm(task: &Task, settings: &Settings, notifier: &dyn Notifier) {
    if settings.json {
        println!("{}", serde_json::json!({ "alarm": render::task_json(task) }));
    } else {
        println!("{}", render::render_alarm(task, &settings.config.palette()));
    }

    if let Err(err) = notifier.notify(task) {
        tracing::warn!(task_id = task.id, error = %err, "desktop notification failed");
    }
}

pub fn run_command<S: KeyValueStore, C: Clock>(
    api: &mut TaskApi<S, C>,
    command: Command,
    settings: &Settings,
    notifier: &dyn Notifier,
) -> Result<(), AppError> {
    let palette = settings.config.palette();

    match command {
        Command::Add {
            text,
            category,
            due,
            priority,
        } => {
            let fields = TaskFields {
                text: required_text(text)?,
                category,
                due_date: due.as_deref().map(parse_due).transpose()?,
                priority,
            };
            let task = api
                .add_task(fields)
                .ok_or_else(|| AppError::invalid_input("text is required"))?;
            print_task(settings, "Added", &task);
        }
        Command::Toggle { id } => {
            let task = api
                .toggle_task(id)
                .ok_or_else(|| AppError::task_not_found(id))?;
            let verb = if task.completed { "Completed" } else { "Reopened" };
            print_task(settings, verb, &task);
        }
        Command::Delete { id } => match api.delete_task(id) {
            Some(task) => print_task(settings, "Deleted", &task),
            None if settings.json => println!("null"),
            None => println!("No task with id {id}; nothing deleted."),
        },
        Command::Edit {
            id,
            text,
            category,
            due,
            clear_due,
            priority,
        } => {
            let current = api
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::task_not_found(id))?;
            let text = match text {
                Some(value) => required_text(Some(value))?,
                None => current.text,
            };
            let due_date = match (due, clear_due) {
                (_, true) => None,
                (Some(raw), false) => Some(parse_due(&raw)?),
                (None, false) => current.due_date,
            };
            let fields = TaskFields {
                text,
                category: category.or(current.category),
                due_date,
                priority: priority.unwrap_or(current.priority),
            };
            let task = api
                .update_task(id, fields)
                .ok_or_else(|| AppError::task_not_found(id))?;
            print_task(settings, "Updated", &task);
        }
        Command::List { sort } => {
            let mode = sort.unwrap_or_else(|| settings.config.sort_mode());
            let groups = api.organized(mode);
            if settings.json {
                println!("{}", render::groups_json(&groups, mode, api.counts()));
            } else {
                println!(
                    "{}\n\n{}",
                    render::render_header(&settings.config.title(), api.counts(), &palette),
                    render::render_groups(&groups, mode, api.now(), &palette)
                );
            }
        }
        Command::History => {
            let history = api.history();
            if settings.json {
                let payload: Vec<_> = history.iter().map(render::task_json).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else {
                println!("{}", render::render_history(&history, &palette));
            }
        }
        Command::ClearHistory => {
            let removed = api.clear_completed_history();
            if settings.json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("Cleared {removed} completed task(s).");
            }
        }
        Command::Check => match api.check_alarm() {
            Some(task) => announce_alarm(&task, settings, notifier),
            None if settings.json => println!("{}", serde_json::json!({ "alarm": null })),
            None => match api.current_alarm() {
                Some(task) => println!("Alarm still showing: {} ({})", task.text, task.id),
                None => println!("No tasks due soon."),
            },
        },
        Command::Dismiss => match api.dismiss_alarm() {
            Some(task) => print_task(settings, "Dismissed alarm for", &task),
            None if settings.json => println!("null"),
            None => println!("No alarm to dismiss."),
        },
    }

    Ok(())
}
