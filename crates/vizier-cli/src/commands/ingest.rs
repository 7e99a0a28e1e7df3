//! Ingest command - analyze a file and persist its properties.

use std::path::PathBuf;

use colored::Colorize;
use vizier::{JsonStore, TaskState, TracingReporter, Vizier, VizierConfig};
use vizier::input::Parser;
use vizier::task::{StatusReporter, TaskStatus};

use super::{ensure_exists, print_fields, CommandResult};

/// Prints each status update and forwards it to tracing.
struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn report(&self, status: TaskStatus) {
        match status.state {
            TaskState::Pending => println!("{} {}", "..".dimmed(), status.desc),
            TaskState::Success => println!("{} {}", "Done".green().bold(), status.desc),
            TaskState::Failure => println!(
                "{} {}: {}",
                "Failed".red().bold(),
                status.desc,
                status.error.as_deref().unwrap_or_default()
            ),
        }
        TracingReporter.report(status);
    }
}

pub fn run(file: PathBuf, dataset: Option<String>, store: PathBuf, config: VizierConfig) -> CommandResult {
    ensure_exists(&file)?;

    let dataset_id = match dataset {
        Some(id) => id,
        None => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| format!("Cannot derive a dataset id from {}", file.display()))?,
    };

    println!(
        "{} {} as {}",
        "Ingesting".cyan().bold(),
        file.display().to_string().white(),
        dataset_id.white().bold()
    );

    let parser = Parser::with_config(config.parser.clone());
    let (table, _) = parser.parse_file(&file)?;

    let store = JsonStore::new(&store);
    let analysis = Vizier::with_config(config).ingest(&dataset_id, &table, &store, &ConsoleReporter)?;

    println!();
    print_fields(&analysis.fields);
    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        store.root().join(&dataset_id).display().to_string().white()
    );

    Ok(())
}
