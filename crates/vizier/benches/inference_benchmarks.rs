//! Inference and recommendation performance benchmarks.
//!
//! Measures per-column classification and the end-to-end table analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vizier::inference::{ClassifierConfig, TypeClassifier};
use vizier::{DataTable, Vizier, VizierConfig};

/// Generate a sales-like table with categorical, numeric and temporal columns.
fn generate_sales_table(rows: usize) -> DataTable {
    let regions = ["north", "south", "east", "west"];
    let countries = ["France", "Spain", "Japan", "Canada", "Brazil"];
    let products = ["widget", "gadget", "gizmo"];

    let headers = ["order_id", "region", "country", "product", "year", "quantity", "revenue"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = (0..rows)
        .map(|row| {
            vec![
                (row + 1).to_string(),
                regions[row % regions.len()].to_string(),
                countries[row % countries.len()].to_string(),
                products[row % products.len()].to_string(),
                (2000 + row % 20).to_string(),
                (1 + row % 40).to_string(),
                format!("{:.2}", 10.0 + (row % 97) as f64 * 3.75),
            ]
        })
        .collect();

    DataTable::new(headers, rows)
}

fn deterministic() -> VizierConfig {
    VizierConfig {
        classifier: ClassifierConfig::deterministic(),
        ..VizierConfig::default()
    }
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    let columns: [(&str, Vec<String>); 4] = [
        ("integer", (0..1000).map(|i| i.to_string()).collect()),
        ("decimal", (0..1000).map(|i| format!("{}.5", i)).collect()),
        ("country", (0..1000).map(|i| ["France", "Japan", "Peru"][i % 3].to_string()).collect()),
        ("date", (0..1000).map(|i| format!("2023-{:02}-{:02}", i % 12 + 1, i % 28 + 1)).collect()),
    ];

    for sample_size in [20, 200] {
        let classifier = TypeClassifier::with_config(ClassifierConfig {
            sample_size,
            ..ClassifierConfig::deterministic()
        });
        for (name, values) in &columns {
            let refs: Vec<&str> = values.iter().map(String::as_str).collect();
            group.bench_with_input(
                BenchmarkId::new(*name, sample_size),
                &refs,
                |b, refs| b.iter(|| classifier.classify(black_box(name), black_box(refs))),
            );
        }
    }

    group.finish();
}

fn bench_analyze_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_table");
    let vizier = Vizier::with_config(deterministic());

    for rows in [100, 1_000, 10_000] {
        let table = generate_sales_table(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| vizier.analyze_table(black_box(table)))
        });
    }

    group.finish();
}

fn bench_recommend(c: &mut Criterion) {
    let vizier = Vizier::with_config(deterministic());
    let fields = vizier
        .analyze_table(&generate_sales_table(500))
        .map(|a| a.fields)
        .unwrap_or_default();

    c.bench_function("recommend", |b| b.iter(|| vizier.recommend(black_box(&fields))));
}

criterion_group!(benches, bench_classification, bench_analyze_table, bench_recommend);
criterion_main!(benches);
