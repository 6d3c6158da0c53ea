//! Depthscope CLI - frame-accurate review of recorded color+depth streams.

mod commands;
mod error;
mod input;
mod logging;
mod snapshot;
mod ui;

use clap::{Parser, Subcommand};

/// Command-line interface for the depthscope viewer.
#[derive(Parser)]
#[command(
    name = "depthscope",
    version = depthscope::VERSION,
    about = "Frame-accurate review of recorded color+depth sensor streams"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive terminal viewer
    View(commands::view::ViewArgs),
    /// Step through a recording headlessly and run one query
    Probe(commands::probe::ProbeArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::View(args) => commands::view::run(args),
        Command::Probe(args) => commands::probe::run(args),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
