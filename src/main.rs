use anyhow::Result;
use clap::Parser;
use functypes::cli::Cli;
use functypes::config::{self, Config};
use functypes::observability::init_logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    functypes::generate(&config)?;
    Ok(())
}

// Explicit --config must load; a discovered one may be skipped
fn build_config(cli: &Cli) -> Result<Config> {
    let file = match &cli.config {
        Some(path) => Some(config::load_config_file(path)?),
        None => std::env::current_dir()
            .ok()
            .and_then(config::discover_config),
    };
    Ok(Config::resolve(cli.overrides(), file)?)
}
