//! Interactive session: reads commands from stdin while a timer runs the
//! due-soon check in the background.

use crate::cli::Cli;
use crate::commands::{Settings, announce_alarm, normalize_parse_error, run_command};
use crate::render;
use clap::{CommandFactory, Parser};
use duesoon_core::clock::Clock;
use duesoon_core::config::Config;
use duesoon_core::error::AppError;
use duesoon_core::notify::Notifier;
use duesoon_core::storage::KeyValueStore;
use duesoon_core::task_api::TaskApi;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    println!("{}", cmd.render_help());
    println!("Session commands: help, quit");
}

/// Runs one line typed into the session. Errors are reported, never fatal.
pub fn handle_line<S: KeyValueStore, C: Clock>(
    api: &mut TaskApi<S, C>,
    line: &str,
    base: &Config,
    notifier: &dyn Notifier,
) -> Flow {
    let line = line.trim();
    if line.is_empty() {
        return Flow::Continue;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Flow::Exit;
    }
    if line == "help" || line == "?" {
        print_help();
        return Flow::Continue;
    }

    let args = match split_command_line(line) {
        Ok(args) if !args.is_empty() => args,
        Ok(_) => return Flow::Continue,
        Err(err) => {
            eprintln!("ERROR: {err}");
            return Flow::Continue;
        }
    };

    let argv = std::iter::once("duesoon".to_string()).chain(args);
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            println!("{err}");
            return Flow::Continue;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            return Flow::Continue;
        }
    };

    let Some(command) = cli.command.clone() else {
        return Flow::Continue;
    };
    let result = Settings::from_cli(base, &cli)
        .and_then(|settings| run_command(api, command, &settings, notifier));
    if let Err(err) = result {
        eprintln!("ERROR: {err}");
    }

    Flow::Continue
}

fn run_check<S: KeyValueStore, C: Clock>(
    api: &mut TaskApi<S, C>,
    settings: &Settings,
    notifier: &dyn Notifier,
) {
    if let Some(task) = api.check_alarm() {
        announce_alarm(&task, settings, notifier);
        println!("Type `dismiss` to acknowledge.");
    }
}

/// Runs until stdin closes, the user quits, or Ctrl-C arrives. The first
/// due-soon check happens immediately.
pub async fn run_session<S: KeyValueStore, C: Clock>(
    api: &mut TaskApi<S, C>,
    config: &Config,
    notifier: &dyn Notifier,
) -> Result<(), AppError> {
    let palette = config.palette();
    println!(
        "{}",
        render::render_header(&config.title(), api.counts(), &palette)
    );
    println!("Type `help` for commands, `quit` to leave.");

    let settings = Settings {
        config: config.clone(),
        json: false,
    };
    let mut ticker = tokio::time::interval(config.check_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    let mut signal_armed = true;
    tracing::debug!(interval = ?config.check_interval(), "session started");

    // The first tick completes at once; check before reading any input.
    ticker.tick().await;
    run_check(api, &settings, notifier);

    loop {
        tokio::select! {
            biased;

            result = &mut ctrl_c, if signal_armed => match result {
                Ok(()) => break,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot listen for ctrl-c");
                    signal_armed = false;
                }
            },
            _ = ticker.tick() => run_check(api, &settings, notifier),
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if handle_line(api, &line, config, notifier) == Flow::Exit {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => return Err(AppError::io(format!("failed to read stdin: {err}"))),
            },
        }
    }

    tracing::debug!("session ended");
    Ok(())
}
