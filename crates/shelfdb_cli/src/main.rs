//! ShelfDB CLI
//!
//! Command-line tools for ShelfDB store files.
//!
//! # Commands
//!
//! - `inspect` - Display store statistics
//! - `dump` - Print the stored records as JSON
//! - `verify` - Check that the store decodes and its records are well formed
//! - `convert` - Rewrite the store in another format

mod commands;

use clap::{Parser, Subcommand};
use shelfdb_codec::Format;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ShelfDB command-line store tools.
#[derive(Parser)]
#[command(name = "shelfdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
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
    /// Display store statistics
    Inspect {
        /// Show per-type record counts
        #[arg(short, long)]
        types: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Print the stored records as pretty JSON
    Dump {
        /// Only dump records of this type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Verify store integrity
    Verify,

    /// Rewrite the store in another format
    Convert {
        /// Target format (json, cbor)
        #[arg(long)]
        to: Format,

        /// Write to this file instead of replacing the store in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

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
        Commands::Inspect { types, output } => {
            let path = cli.path.ok_or("Store path required for inspect")?;
            commands::inspect::run(&path, types, &output)?;
        }
        Commands::Dump { type_name } => {
            let path = cli.path.ok_or("Store path required for dump")?;
            commands::dump::run(&path, type_name.as_deref())?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Store path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Convert { to, output } => {
            let path = cli.path.ok_or("Store path required for convert")?;
            commands::convert::run(&path, to, output.as_deref())?;
        }
        Commands::Version => {
            println!("ShelfDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ShelfDB Core v{}", shelfdb_core::VERSION);
        }
    }

    Ok(())
}
