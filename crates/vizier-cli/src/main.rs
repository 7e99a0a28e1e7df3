//! Vizier CLI - field-type inference and visualization recommendations.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_config(&cli.config).and_then(|config| match cli.command {
        Commands::Analyze { file, json } => commands::analyze::run(file, json, config, cli.verbose),

        Commands::Specs { file, limit, json } => commands::specs::run(file, limit, json, config),

        Commands::Ingest { file, dataset, store } => commands::ingest::run(file, dataset, store, config),

        Commands::Override {
            dataset,
            field,
            field_type,
            store,
        } => commands::override_type::run(dataset, field, field_type, store, config),

        Commands::Show { dataset, store, json } => commands::show::run(dataset, store, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
