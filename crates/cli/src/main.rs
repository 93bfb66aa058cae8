//! Licenser CLI - license lifecycle for a product install

use anyhow::{Context, Result};
use clap::Parser;
use licenser_core::LicenserConfig;
use std::process::ExitCode;

use licenser_cli::{commands, logging, Cli, Commands};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Init { path } = &cli.command {
        commands::init::run(path.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let format = cli.format;

    match cli.command {
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
        Commands::Activate { key } => commands::license::activate(&config, &key, format),
        Commands::Deactivate { yes } => commands::license::deactivate(&config, yes, format),
        Commands::Refresh => commands::license::refresh(&config, format),
        Commands::Status => commands::license::status(&config, format),
        Commands::Check { attr, value } => {
            commands::check::run(&config, attr.as_deref().zip(value.as_deref()), format)
        }
        Commands::Schedule => commands::schedule::schedule(&config, format),
        Commands::Unschedule => commands::schedule::unschedule(&config, format),
        Commands::Tick => commands::schedule::tick(&config, format),
    }
}

fn load_config(cli: &Cli) -> Result<LicenserConfig> {
    let mut config = match &cli.config {
        Some(path) => LicenserConfig::from_file(path)?,
        None => {
            let cwd = std::env::current_dir().context("could not read current directory")?;
            LicenserConfig::find_and_load(&cwd)?
        }
    };
    config.apply_env_overrides();
    config
        .validate()
        .context("run 'licenser init' and fill in licenser.toml")?;
    Ok(config)
}
