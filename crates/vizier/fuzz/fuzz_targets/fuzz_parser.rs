//! Fuzz target for the data parser and the analysis pipeline behind it.
//!
//! Arbitrary bytes must either fail with an error or produce an analysis;
//! neither parsing nor inference may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vizier::input::Parser;
use vizier::inference::ClassifierConfig;
use vizier::{Vizier, VizierConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';'] {
        if let Ok(table) = parser.parse_bytes(data, delimiter) {
            let vizier = Vizier::with_config(VizierConfig {
                classifier: ClassifierConfig::deterministic(),
                ..VizierConfig::default()
            });
            let _ = vizier.analyze_table(&table);
        }
    }
});
