//! Override command - set a stored field's type by hand.

use std::path::PathBuf;

use colored::Colorize;
use vizier::{FieldType, JsonStore, PropertyStore, Vizier, VizierConfig};

use super::CommandResult;

pub fn run(dataset: String, field: String, field_type: String, store: PathBuf, config: VizierConfig) -> CommandResult {
    let new_type = FieldType::from_name(&field_type).ok_or_else(|| {
        let known: Vec<&str> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
        format!("Unknown type: {}. Use one of: {}", field_type, known.join(", "))
    })?;

    let store = JsonStore::new(&store);
    let updated = store.override_field_type(&dataset, &field, new_type)?;

    println!(
        "{} {} to {} ({})",
        "Set".green().bold(),
        updated.name.white(),
        updated.field_type().to_string().magenta().bold(),
        updated.general_type().code()
    );

    let fields = store.field_properties(&dataset)?;
    let specs = Vizier::with_config(config).recommend(&fields);
    println!("{} visualization specs after override", specs.len().to_string().white().bold());

    Ok(())
}
