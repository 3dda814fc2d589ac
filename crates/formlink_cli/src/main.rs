//! formlink CLI
//!
//! Command-line tools for query-synced form schemas.
//!
//! # Commands
//!
//! - `resolve` - Show the values a page starts with for a query string
//! - `normalize` - Rewrite a query string canonically, dropping defaults
//! - `check` - Validate a schema: defaults, options and key collisions
//! - `codecs` - List the codec tags a schema may use

mod commands;
mod error;
mod schema;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// formlink command-line tools.
#[derive(Parser)]
#[command(name = "formlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the form schema (JSON)
    #[arg(global = true, short, long)]
    schema: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the values a first visit to a query string starts with
    Resolve {
        /// Query string, with or without the leading `?`
        query: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Rewrite a query string canonically, dropping defaults
    Normalize {
        /// Query string, with or without the leading `?`
        query: String,
    },

    /// Validate a schema
    Check,

    /// List the codec tags a schema may use
    Codecs,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve { query, format } => {
            let path = cli.schema.ok_or("Schema path required for resolve")?;
            commands::resolve::run(&path, &query, &format)?;
        }
        Commands::Normalize { query } => {
            let path = cli.schema.ok_or("Schema path required for normalize")?;
            commands::normalize::run(&path, &query)?;
        }
        Commands::Check => {
            let path = cli.schema.ok_or("Schema path required for check")?;
            commands::check::run(&path)?;
        }
        Commands::Codecs => commands::codecs::run(),
        Commands::Version => {
            println!("formlink CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
