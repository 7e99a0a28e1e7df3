//! Show command - print stored properties for a dataset.

use std::path::PathBuf;

use colored::Colorize;
use vizier::{JsonStore, PropertyStore};

use super::{print_fields, CommandResult};

pub fn run(dataset: String, store: PathBuf, json: bool) -> CommandResult {
    let store = JsonStore::new(&store);
    let fields = store.field_properties(&dataset)?;
    let properties = store.dataset_properties(&dataset)?;

    if fields.is_empty() && properties.is_none() {
        return Err(format!(
            "No stored properties for '{}'\nRun 'vizier ingest <FILE> --dataset {}' first.",
            dataset, dataset
        )
        .into());
    }

    if json {
        let out = serde_json::json!({
            "dataset_id": dataset,
            "fields": fields,
            "dataset": properties,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} {}", "Stored properties for".cyan().bold(), dataset.white());
    if let Some(p) = &properties {
        println!(
            "{} rows, {} columns, {:?} structure, ingested {}",
            p.n_rows,
            p.n_cols,
            p.structure,
            p.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();

    println!("{}", "Fields:".yellow().bold());
    print_fields(&fields);

    let manual = fields.iter().filter(|f| f.manual).count();
    if manual > 0 {
        println!();
        println!("{} manual override(s), marked with *", manual.to_string().magenta());
    }

    Ok(())
}
