//! Specs command - list candidate visualizations for a data file.

use std::path::PathBuf;

use colored::Colorize;
use vizier::{Vizier, VizierConfig};

use super::{ensure_exists, CommandResult};

pub fn run(file: PathBuf, limit: Option<usize>, json: bool, config: VizierConfig) -> CommandResult {
    ensure_exists(&file)?;

    let analysis = Vizier::with_config(config).analyze(&file)?;
    let shown = &analysis.specs[..limit.unwrap_or(usize::MAX).min(analysis.specs.len())];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    println!(
        "{} {} candidate visualizations for {}",
        "Found".cyan().bold(),
        analysis.specs.len().to_string().white().bold(),
        file.display()
    );
    println!();

    for (i, spec) in shown.iter().enumerate() {
        let viz: Vec<String> = spec
            .viz_types
            .iter()
            .map(|v| format!("{:?}", v).to_lowercase())
            .collect();
        println!(
            "{:>4}. {:18} {:6} {}  {}",
            i + 1,
            spec.generating_procedure.as_str().yellow(),
            spec.type_structure.as_str(),
            spec.meta.desc.white(),
            format!("[{}]", viz.join(", ")).dimmed()
        );
    }

    if shown.len() < analysis.specs.len() {
        println!();
        println!("... {} more", analysis.specs.len() - shown.len());
    }

    Ok(())
}
