//! mdtrilium CLI entry point.

use clap::Parser;
use mdtrilium::cli::args::{Cli, Commands};
use mdtrilium::cli::output::Output;
use mdtrilium::cli::{import, inspect, tree};
use mdtrilium::config::Config;
use mdtrilium::error::{ExitCode as ImportExitCode, ImportError};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code.code() as u8),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<ImportExitCode, ImportError> {
    let config = Config::load(cli.config.as_deref())?;
    let output = Output::new(cli.output_format());

    match &cli.command {
        Commands::Import(args) => import::run(&config, args, &output),
        Commands::Tree(args) => {
            tree::run(&config, args, &output, cli.explicit_format().is_some())?;
            Ok(ImportExitCode::Success)
        }
        Commands::Inspect(args) => {
            inspect::run(&config, args, &output)?;
            Ok(ImportExitCode::Success)
        }
    }
}
