// ABOUTME: CLI entry point for inventory-cutover
// ABOUTME: Parses commands and routes to appropriate handlers

use clap::{Parser, Subcommand};
use inventory_cutover::{commands, utils};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inventory-cutover")]
#[command(about = "One-shot SQLite to PostgreSQL cutover for the inventory backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate source and destination databases are ready for the cutover
    Validate {
        /// Path to the backend's SQLite database file
        #[arg(long)]
        source: PathBuf,
        /// Destination PostgreSQL URL (falls back to DATABASE_URL)
        #[arg(long)]
        target: Option<String>,
    },
    /// Copy all tables from the source to the destination in one transaction
    Migrate {
        /// Path to the backend's SQLite database file
        #[arg(long)]
        source: PathBuf,
        /// Destination PostgreSQL URL (falls back to DATABASE_URL)
        #[arg(long)]
        target: Option<String>,
        /// Skip the row-count confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Verify data integrity between source and destination
    Verify {
        /// Path to the backend's SQLite database file
        #[arg(long)]
        source: PathBuf,
        /// Destination PostgreSQL URL (falls back to DATABASE_URL)
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { source, target } => {
            let target_url = utils::resolve_target_url(target)?;
            commands::validate(&source, &target_url).await
        }
        Commands::Migrate {
            source,
            target,
            yes,
        } => {
            let target_url = utils::resolve_target_url(target)?;
            commands::migrate(&source, &target_url, yes).await
        }
        Commands::Verify { source, target } => {
            let target_url = utils::resolve_target_url(target)?;
            commands::verify(&source, &target_url).await
        }
    }
}
