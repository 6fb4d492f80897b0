//! Faktur CLI
//!
//! Maintenance tools for Faktur storage roots.
//!
//! # Commands
//!
//! - `inspect` - Show schema version and record counts
//! - `migrate` - Bring a storage root up to the current schema version
//! - `relocate` - Move a storage root to a new location
//! - `reset` - Delete all documents and reset settings to defaults
//! - `check-format` - Validate a document number template

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Faktur storage maintenance tools.
#[derive(Parser)]
#[command(name = "faktur")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the storage root
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show schema version and record counts
    Inspect,

    /// Bring the storage root up to the current schema version
    Migrate,

    /// Move the storage root to a new location
    Relocate {
        /// Destination root
        #[arg(long)]
        to: PathBuf,

        /// Remove the old tree after a successful copy
        #[arg(long)]
        remove_old: bool,
    },

    /// Delete all documents and reset settings to defaults
    Reset {
        /// Confirm the irreversible reset
        #[arg(long)]
        yes: bool,
    },

    /// Validate a document number template
    CheckFormat {
        /// The template, e.g. "{PREFIX}-{YEAR}-{NUMBER:4}"
        template: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect => {
            let path = cli.path.ok_or("Storage root required for inspect")?;
            commands::inspect::run(&path)?;
        }
        Commands::Migrate => {
            let path = cli.path.ok_or("Storage root required for migrate")?;
            commands::migrate::run(&path)?;
        }
        Commands::Relocate { to, remove_old } => {
            let path = cli.path.ok_or("Storage root required for relocate")?;
            commands::relocate::run(&path, &to, remove_old)?;
        }
        Commands::Reset { yes } => {
            let path = cli.path.ok_or("Storage root required for reset")?;
            if !yes {
                return Err("Refusing to reset without --yes".into());
            }
            commands::reset::run(&path)?;
        }
        Commands::CheckFormat { template } => {
            commands::check_format::run(&template)?;
        }
    }

    Ok(())
}
