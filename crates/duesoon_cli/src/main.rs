use clap::Parser;
use duesoon_cli::cli::Cli;
use duesoon_cli::commands::{Settings, normalize_parse_error, run_command};
use duesoon_cli::session;
use duesoon_core::config::{Config, load_config_with_fallback};
use duesoon_core::error::AppError;
use duesoon_core::notify::notifier_from_env;
use duesoon_core::task_api::TaskApi;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "duesoon_core=warn,duesoon_cli=warn";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_base_config() -> Config {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        tracing::warn!(error = %err, "falling back to default configuration");
    }
    loaded.config
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::io(format!("failed to start runtime: {err}")))?;
    let mut api = TaskApi::open();
    let notifier = notifier_from_env();

    let result = runtime.block_on(session::run_session(&mut api, config, notifier.as_ref()));
    // A pending stdin read cannot be cancelled; don't wait on it.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

fn run(cli: Cli) -> Result<(), AppError> {
    let base = load_base_config();
    let settings = Settings::from_cli(&base, &cli)?;

    match cli.command {
        None => run_interactive(&settings.config),
        Some(command) => {
            let mut api = TaskApi::open();
            let notifier = notifier_from_env();
            run_command(&mut api, command, &settings, notifier.as_ref())
        }
    }
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
