//! ClusterConf CLI
//!
//! Command-line tools for cluster configuration dumps.
//!
//! # Commands
//!
//! - `show` - Display the canonical summary and validity of a dump
//! - `validate` - Exit non-zero when a dump is not a valid configuration
//! - `exclusions` - List excluded servers
//! - `preset` - Print the key lines that produce a named mode
//!
//! # Dump format
//!
//! One `name=value` line per key, where `name` is the key without the
//! `\xff/conf/` prefix. Blank lines and lines starting with `#` are skipped.
//! Replication policy values are written as descriptors such as
//! `zoneid^3 x 1`. Non-printable bytes may be written as `\xNN`.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cluster configuration tools.
#[derive(Parser)]
#[command(name = "clusterconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration dump
    #[arg(global = true, short, long)]
    file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the canonical summary and validity
    Show {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Also list every stored key
        #[arg(short, long)]
        keys: bool,
    },

    /// Check the configuration and fail if it is invalid
    Validate,

    /// List excluded servers
    Exclusions {
        /// Check whether this address (ip:port) is excluded
        #[arg(short, long)]
        check: Option<String>,
    },

    /// Print the key lines that produce a named mode
    Preset {
        /// Mode name (e.g. triple, ssd-2, two_satellite_fast, remote_none)
        name: String,
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
        Commands::Show { format, keys } => {
            let path = cli.file.ok_or("Dump file required for show")?;
            let config = commands::dump::load(&path)?;
            commands::show::run(&config, &format, keys)?;
        }
        Commands::Validate => {
            let path = cli.file.ok_or("Dump file required for validate")?;
            let config = commands::dump::load(&path)?;
            commands::validate::run(&config)?;
        }
        Commands::Exclusions { check } => {
            let path = cli.file.ok_or("Dump file required for exclusions")?;
            let config = commands::dump::load(&path)?;
            commands::exclusions::run(&config, check.as_deref())?;
        }
        Commands::Preset { name } => {
            commands::preset::run(&name)?;
        }
        Commands::Version => {
            println!("ClusterConf CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ClusterConf Core v{}", clusterconf_core::VERSION);
            println!(
                "Blob format v{}",
                clusterconf_codec::FORMAT_VERSION
            );
        }
    }

    Ok(())
}
