//! Example: Analyze a tabular data file with Vizier.
//!
//! Usage:
//!   cargo run --example analyze -- <file_path>

use std::env;
use std::path::Path;

use vizier::Vizier;

fn main() -> vizier::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example analyze -- <file_path>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let analysis = Vizier::new().analyze(path)?;

    println!("=== Fields ===");
    for field in &analysis.fields {
        println!(
            "{:>3} {:20} {:16} {}{}",
            field.index,
            field.name,
            field.field_type().to_string(),
            field.general_type().code(),
            if field.is_unique { " (unique)" } else { "" }
        );
    }

    println!("\n=== Dataset ===");
    println!("{:?}, {} rows", analysis.dataset.structure, analysis.dataset.n_rows);

    println!("\n=== First 10 specs ===");
    for spec in analysis.specs.iter().take(10) {
        println!("{:18} {}", spec.generating_procedure.as_str(), spec.meta.desc);
    }
    println!("... {} in total", analysis.specs.len());

    Ok(())
}
