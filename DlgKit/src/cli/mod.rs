//! DlgKit CLI - Command-line interface for dialogue file tools

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(
    name = "dlgkit",
    version,
    about = "DlgKit: dialogue graph tools for Odyssey engine conversations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Parse arguments and dispatch to the selected subcommand
pub fn run_cli() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    Cli::parse().command.execute()
}
