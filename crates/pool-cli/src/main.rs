//! Fuzzing pool configuration CLI
//!
//! Resolves pool and map documents and prints what a scheduler would see.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level())
        .map_err(|e| CliError::user(format!("failed to initialise logging: {e}")))?;
    tracing::debug!(command = ?cli.command, "Starting");

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Machines {
            input,
            cpu,
            provider,
            cores,
            ram,
            metal,
        } => commands::run_machines(&input, provider, cpu, cores, &ram, metal),
        Commands::Resolve { path, json } => commands::run_resolve(&path, json),
        Commands::Crons { path, start } => commands::run_crons(&path, start.as_deref()),
        Commands::Candidates { path, machines } => commands::run_candidates(&path, &machines),
        Commands::Preprocess { path } => commands::run_preprocess(&path),
    }
}
