//! `islet` command line interface.

mod commands;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;

use commands::{decode, inspect};

/// Inspect and decode islet envelopes.
#[derive(Parser, Debug)]
#[command(name = "islet", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize an envelope: version, size against the budget, regions and pools.
    Inspect(inspect::Args),

    /// Migrate and resolve an envelope, printing the canonical trees.
    Decode(decode::Args),
}

fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_location_section(false)
        .display_env_section(false)
        .install()?;

    islet::logging::init_with_default("warn");

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect(args) => inspect::run(&args),
        Commands::Decode(args) => decode::run(&args),
    }
}
