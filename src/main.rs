//! EQChain CLI - Live Parametric Equalizer
//!
//! Command-line interface for the eqchain topology manager.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use eqchain::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("EQChain v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("EQChain v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { path, force } => commands::init(&path, force),
        Commands::Show {
            preset,
            sample_rate,
        } => commands::show(&preset, sample_rate),
        Commands::Set { preset, edit } => commands::set(&preset, &edit),
        Commands::Response {
            preset,
            points,
            sample_rate,
        } => commands::response(&preset, points, sample_rate),
        Commands::Render {
            preset,
            input,
            output,
        } => commands::render(&preset, &input, &output),
    }
}
