//! Analyze command - infer field types and properties for a data file.

use std::path::PathBuf;

use colored::Colorize;
use vizier::{Structure, Vizier, VizierConfig};

use super::{ensure_exists, print_fields, CommandResult};

pub fn run(file: PathBuf, json: bool, config: VizierConfig, verbose: bool) -> CommandResult {
    ensure_exists(&file)?;

    let vizier = Vizier::with_config(config);
    let analysis = vizier.analyze(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Analyzed".cyan().bold(),
        file.display().to_string().white(),
        analysis.dataset.n_rows,
        analysis.dataset.n_cols
    );
    println!();

    println!("{}", "Fields:".yellow().bold());
    print_fields(&analysis.fields);
    println!();

    match (&analysis.dataset.structure, &analysis.dataset.time_series) {
        (Structure::Wide, Some(ts)) => println!(
            "Structure: {} (time series {} to {}, {} columns)",
            "wide".green().bold(),
            ts.start.name,
            ts.end.name,
            ts.time_series.num_elements
        ),
        _ => println!("Structure: {}", "long".green().bold()),
    }

    if verbose && !analysis.entities.is_empty() {
        println!();
        println!("{}", "Entities:".yellow().bold());
        for tree in &analysis.entities {
            let chain: Vec<&str> = tree.descendants.iter().map(|f| f.name.as_str()).collect();
            if chain.is_empty() {
                println!("  {}", tree.entity.name);
            } else {
                println!("  {} > {}", tree.entity.name, chain.join(" > "));
            }
        }
    }

    let s = &analysis.summary;
    println!(
        "Columns: {} quantitative, {} categorical, {} temporal ({} unique)",
        s.quantitative_columns.to_string().white().bold(),
        s.categorical_columns.to_string().white().bold(),
        s.temporal_columns.to_string().white().bold(),
        s.unique_columns
    );
    println!(
        "Found {} hierarchies, generated {} visualization specs",
        s.hierarchies.to_string().white().bold(),
        s.specs.to_string().white().bold()
    );
    println!();
    println!(
        "Run {} to list them",
        format!("vizier specs {}", file.display()).cyan().bold()
    );

    Ok(())
}
