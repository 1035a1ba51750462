//! Xmas Events CLI - Schema setup and installation management.
//!
//! # Usage
//!
//! ```bash
//! # Create the installations table
//! xmas-cli migrate
//!
//! # List installed shops (never prints access tokens)
//! xmas-cli shops list
//! ```
//!
//! # Environment Variables
//!
//! - `XMAS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "xmas-cli")]
#[command(author, version, about = "Xmas Events CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Migrate,
    /// Manage installed shops
    Shops {
        #[command(subcommand)]
        action: ShopsAction,
    },
}

#[derive(Subcommand)]
enum ShopsAction {
    /// List installed shops
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Shops { action } => match action {
            ShopsAction::List => commands::shops::list().await?,
        },
    }
    Ok(())
}
