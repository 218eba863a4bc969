//! Bazaar — marketplace admin roster CLI.
//!
//! # Usage
//!
//! ```text
//! bazaar seed [--root <dir>]
//! bazaar list <category> [--filter <query>] [--sort <key>] [--desc] [--json]
//! bazaar show <category> <id>
//! bazaar watch <category>
//! ```
//!
//! Categories: `users`, `developers`,
//! `apps:published|pending|rejected|suspended`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{list::ListArgs, seed::SeedArgs, show::ShowArgs, watch::WatchArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "bazaar",
    version,
    about = "Inspect and follow marketplace admin rosters",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a small sample catalog for local exploration.
    Seed(SeedArgs),

    /// Hydrate a roster once and print it.
    List(ListArgs),

    /// Fetch and print one entity record.
    Show(ShowArgs),

    /// Follow a roster live until interrupted.
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Seed(args) => args.run(),
        Commands::List(args) => args.run().await,
        Commands::Show(args) => args.run().await,
        Commands::Watch(args) => args.run().await,
    }
}
