use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use kiemke_app::config::{LOG_FORMAT_VAR, resolve_log_format};
use kiemke_app::{AppConfig, Cli, run_command};
use kiemke_infra::JsonDirSessionStore;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = resolve_log_format(&cli, |name| std::env::var(name).ok());
    kiemke_observability::init_with(log_format.as_ref().copied().unwrap_or_default());
    if let Err(err) = log_format {
        tracing::warn!(var = LOG_FORMAT_VAR, %err, "using default log format");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().with_overrides(cli);
    tracing::debug!(store_dir = %config.store_dir.display(), "configuration loaded");

    let store = JsonDirSessionStore::new(&config.store_dir);
    let output = run_command(&cli.command, &config, &store)?;

    let json = serde_json::to_string_pretty(&output).context("rendering output")?;
    println!("{json}");
    Ok(())
}
