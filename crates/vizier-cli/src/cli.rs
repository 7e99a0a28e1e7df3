//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Vizier: field-type inference and visualization recommendations
#[derive(Parser)]
#[command(name = "vizier")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Configuration file and per-run overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Values sampled per column for type detection
    #[arg(long, global = true)]
    pub sample_size: Option<usize>,

    /// Sample the first values instead of a random subset
    #[arg(long, global = true)]
    pub deterministic: bool,

    /// Seed for random sampling
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer field types and properties for a data file
    Analyze {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List candidate visualizations for a data file
    Specs {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Show at most this many specs
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print specs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a data file and save its properties to a store
    Ingest {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dataset id (default: file stem)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Store directory
        #[arg(short, long, default_value = ".vizier")]
        store: PathBuf,
    },

    /// Set a stored field's type by hand
    Override {
        /// Dataset id
        dataset: String,

        /// Field name
        field: String,

        /// New type (e.g. string, integer, country_code_2)
        #[arg(value_name = "TYPE")]
        field_type: String,

        /// Store directory
        #[arg(short, long, default_value = ".vizier")]
        store: PathBuf,
    },

    /// Show stored properties for a dataset
    Show {
        /// Dataset id
        dataset: String,

        /// Store directory
        #[arg(short, long, default_value = ".vizier")]
        store: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
