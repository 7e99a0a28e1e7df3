//! CLI command implementations.

pub mod analyze;
pub mod ingest;
pub mod override_type;
pub mod show;
pub mod specs;

use std::path::Path;

use colored::Colorize;
use vizier::{FieldProperties, VizierConfig};

use crate::cli::ConfigArgs;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load the configuration file, if any, and apply flag overrides.
pub fn load_config(args: &ConfigArgs) -> Result<VizierConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => VizierConfig::load(path)?,
        None => VizierConfig::default(),
    };

    if let Some(n) = args.sample_size {
        config.classifier.sample_size = n;
    }
    if args.deterministic {
        config.classifier.randomize = false;
    }
    if args.seed.is_some() {
        config.classifier.seed = args.seed;
    }
    Ok(config)
}

pub(crate) fn ensure_exists(file: &Path) -> CommandResult {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(())
}

/// One line per field: name, type, general type and flags.
pub(crate) fn print_fields(fields: &[FieldProperties]) {
    for field in fields {
        let mut flags = Vec::new();
        if field.is_unique {
            flags.push("unique".to_string());
        }
        if let Some(child) = &field.child {
            flags.push(format!("parent of {}", child));
        }
        if field.is_child {
            flags.push("child".to_string());
        }
        if field.contiguous {
            flags.push("contiguous".to_string());
        }
        if let Some(n) = &field.normality {
            flags.push(format!("normality p={:.3}", n.p_value));
        }

        let field_type = if field.manual {
            format!("{}*", field.field_type()).magenta()
        } else {
            field.field_type().to_string().white()
        };

        println!(
            "  {:24} {:16} {:2} {}",
            field.name,
            field_type,
            field.general_type().code().cyan(),
            flags.join(", ").dimmed()
        );
    }
}
