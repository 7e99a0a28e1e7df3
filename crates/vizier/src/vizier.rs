//! Main Vizier struct and public API.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::VizierConfig;
use crate::error::{Result, VizierError};
use crate::inference::{
    detect_hierarchies, detect_time_series, entity_trees, EntityTree, FieldPropertyComputer, TypeClassifier,
};
use crate::input::{DataTable, Parser, SourceMetadata};
use crate::recommend::{SpecGenerator, VisualizationSpec};
use crate::schema::{DatasetProperties, FieldProperties, GeneralType};
use crate::store::{carry_overrides, PropertyStore};
use crate::task::{StatusReporter, TaskStatus};

/// Result of analyzing a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Metadata about the source file, when the dataset was read from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// One record per column, in column order.
    pub fields: Vec<FieldProperties>,
    pub dataset: DatasetProperties,
    /// Candidate visualizations in rule order.
    pub specs: Vec<VisualizationSpec>,
    /// Categorical and temporal columns with their nested child columns.
    pub entities: Vec<EntityTree>,
    pub summary: AnalysisSummary,
}

/// Summary of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub total_columns: usize,
    pub quantitative_columns: usize,
    pub categorical_columns: usize,
    pub temporal_columns: usize,
    pub unique_columns: usize,
    /// Parent/child column pairs found.
    pub hierarchies: usize,
    pub specs: usize,
}

impl AnalysisSummary {
    fn compute(fields: &[FieldProperties], specs: &[VisualizationSpec]) -> Self {
        let mut summary = Self {
            total_columns: fields.len(),
            specs: specs.len(),
            ..Self::default()
        };
        for field in fields {
            match field.general_type() {
                GeneralType::Quantitative => summary.quantitative_columns += 1,
                GeneralType::Categorical => summary.categorical_columns += 1,
                GeneralType::Temporal => summary.temporal_columns += 1,
            }
            if field.is_unique {
                summary.unique_columns += 1;
            }
            if field.child.is_some() {
                summary.hierarchies += 1;
            }
        }
        summary
    }
}

/// The analysis pipeline: field properties, dataset structure, then specs.
pub struct Vizier {
    parser: Parser,
    computer: FieldPropertyComputer,
    generator: SpecGenerator,
}

impl Vizier {
    /// Create a new Vizier instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(VizierConfig::default())
    }

    /// Create a Vizier instance with custom configuration.
    pub fn with_config(config: VizierConfig) -> Self {
        let classifier = TypeClassifier::with_config(config.classifier);
        Self {
            parser: Parser::with_config(config.parser),
            computer: FieldPropertyComputer::new(classifier, config.properties),
            generator: SpecGenerator::with_config(config.generator),
        }
    }

    /// Replace the property computer, e.g. one built on a reduced detector registry.
    pub fn with_computer(mut self, computer: FieldPropertyComputer) -> Self {
        self.computer = computer;
        self
    }

    /// Replace the spec generator, e.g. one built on a reduced rule table.
    pub fn with_generator(mut self, generator: SpecGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Read a delimited file and analyze it.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<Analysis> {
        let (table, source) = self.parser.parse_file(path)?;
        let mut analysis = self.analyze_table(&table)?;
        analysis.source = Some(source);
        Ok(analysis)
    }

    /// Analyze an in-memory table.
    #[instrument(skip_all, fields(columns = table.column_count(), rows = table.row_count()))]
    pub fn analyze_table(&self, table: &DataTable) -> Result<Analysis> {
        let fields = self.computer.compute(table)?;
        let dataset = self.dataset_properties(table, &fields);
        let specs = self.recommend(&fields);
        let entities = entity_trees(&fields);
        let summary = AnalysisSummary::compute(&fields, &specs);

        Ok(Analysis {
            source: None,
            fields,
            dataset,
            specs,
            entities,
            summary,
        })
    }

    /// Generate specs from already computed (possibly stored and overridden) fields.
    pub fn recommend(&self, fields: &[FieldProperties]) -> Vec<VisualizationSpec> {
        let start = Instant::now();
        let specs = self.generator.generate(fields);
        info!(elapsed = ?start.elapsed(), count = specs.len(), "spec generation");
        specs
    }

    /// Analyze a table and persist its properties.
    ///
    /// Progress goes to `reporter`. Manual type overrides already stored for
    /// columns still present are applied before hierarchies, dataset
    /// structure and specs are derived. Field and dataset records are saved
    /// together, so a failed run leaves the store as it was.
    #[instrument(skip(self, table, store, reporter))]
    pub fn ingest(
        &self,
        dataset_id: &str,
        table: &DataTable,
        store: &dyn PropertyStore,
        reporter: &dyn StatusReporter,
    ) -> Result<Analysis> {
        let fail = |desc: &str, e: VizierError| {
            warn!(error = %e, desc, "ingestion failed");
            reporter.report(TaskStatus::failure(desc, e.to_string()));
            e
        };

        reporter.report(TaskStatus::pending("computing field properties"));
        let mut analysis = self
            .analyze_table(table)
            .map_err(|e| fail("computing field properties", e))?;

        reporter.report(TaskStatus::pending("applying manual overrides"));
        let stored = store
            .field_properties(dataset_id)
            .map_err(|e| fail("applying manual overrides", e))?;
        if carry_overrides(&mut analysis.fields, &stored) {
            detect_hierarchies(&mut analysis.fields, table, self.computer.config());
            analysis.dataset = self.dataset_properties(table, &analysis.fields);
            analysis.specs = self.recommend(&analysis.fields);
            analysis.entities = entity_trees(&analysis.fields);
            analysis.summary = AnalysisSummary::compute(&analysis.fields, &analysis.specs);
        }

        reporter.report(TaskStatus::pending("saving properties"));
        store
            .save_ingestion(dataset_id, &analysis.fields, &analysis.dataset)
            .map_err(|e| fail("saving properties", e))?;

        reporter.report(TaskStatus::success(format!(
            "ingested {} fields and {} specs",
            analysis.fields.len(),
            analysis.specs.len()
        )));
        Ok(analysis)
    }

    fn dataset_properties(&self, table: &DataTable, fields: &[FieldProperties]) -> DatasetProperties {
        let start = Instant::now();
        let field_types: Vec<_> = fields.iter().map(|f| f.field_type()).collect();
        let time_series = detect_time_series(&table.headers, &field_types);
        let dataset = DatasetProperties::new(table.row_count(), table.headers.clone(), field_types, time_series);
        info!(elapsed = ?start.elapsed(), structure = ?dataset.structure, "dataset structure");
        dataset
    }
}

impl Default for Vizier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ClassifierConfig;
    use crate::recommend::GeneratingProcedure;
    use crate::schema::{FieldType, Structure};
    use crate::store::MemoryStore;
    use crate::task::{RecordingReporter, TaskState};

    fn vizier() -> Vizier {
        Vizier::with_config(VizierConfig {
            classifier: ClassifierConfig::deterministic(),
            ..VizierConfig::default()
        })
    }

    fn staff() -> DataTable {
        DataTable::from_rows(
            &["id", "department", "gender"],
            &[
                &["1", "Sales", "male"],
                &["2", "Marketing", "female"],
                &["3", "Sales", "female"],
                &["4", "Engineering", "male"],
                &["5", "Marketing", "male"],
                &["6", "Engineering", "female"],
            ],
        )
    }

    #[test]
    fn test_analyze_table() {
        let analysis = vizier().analyze_table(&staff()).unwrap();
        assert_eq!(analysis.fields.len(), 3);
        assert_eq!(analysis.dataset.structure, Structure::Long);
        assert_eq!(analysis.summary.total_columns, 3);
        assert_eq!(analysis.summary.categorical_columns, 2);
        assert_eq!(analysis.summary.specs, analysis.specs.len());
        assert!(analysis.source.is_none());
    }

    #[test]
    fn test_wide_dataset() {
        let table = DataTable::from_rows(
            &["country", "2020-01", "2020-02", "2020-03"],
            &[
                &["France", "150", "150", "150"],
                &["Germany", "240", "240", "240"],
                &["Spain", "310", "310", "310"],
            ],
        );
        let analysis = vizier().analyze_table(&table).unwrap();
        assert_eq!(analysis.dataset.structure, Structure::Wide);
        let ts = analysis.dataset.time_series.unwrap();
        assert_eq!(ts.time_series.num_elements, 3);
        assert_eq!(ts.start.index, 1);
    }

    #[test]
    fn test_ingest_reports_and_saves() {
        let store = MemoryStore::new();
        let reporter = RecordingReporter::new();
        vizier().ingest("staff", &staff(), &store, &reporter).unwrap();

        assert_eq!(store.field_properties("staff").unwrap().len(), 3);
        assert!(store.dataset_properties("staff").unwrap().is_some());

        let updates = reporter.updates();
        assert!(updates[..updates.len() - 1].iter().all(|u| u.state == TaskState::Pending));
        assert_eq!(updates.last().unwrap().state, TaskState::Success);
    }

    #[test]
    fn test_ingest_failure_writes_nothing() {
        let store = MemoryStore::new();
        let reporter = RecordingReporter::new();
        let empty = DataTable::from_rows(&["a", "b"], &[]);

        let err = vizier().ingest("empty", &empty, &store, &reporter).unwrap_err();
        assert!(err.is_input_error());
        assert!(store.field_properties("empty").unwrap().is_empty());
        assert!(store.dataset_properties("empty").unwrap().is_none());

        let last = reporter.last().unwrap();
        assert_eq!(last.state, TaskState::Failure);
        assert!(last.error.is_some());
    }

    #[test]
    fn test_reingest_keeps_override() {
        let store = MemoryStore::new();
        let reporter = RecordingReporter::new();
        let v = vizier();
        v.ingest("staff", &staff(), &store, &reporter).unwrap();
        store.override_field_type("staff", "id", FieldType::String).unwrap();

        let analysis = v.ingest("staff", &staff(), &store, &reporter).unwrap();
        assert_eq!(analysis.fields[0].field_type(), FieldType::String);
        assert_eq!(analysis.summary.quantitative_columns, 0);
        assert!(analysis
            .specs
            .iter()
            .any(|s| s.generating_procedure == GeneratingProcedure::ValueCount && s.field_ids == [0]));
        assert_eq!(analysis.dataset.field_types[0], FieldType::String);
        assert_eq!(
            store.dataset_properties("staff").unwrap().unwrap().field_types[0],
            FieldType::String
        );
    }

    #[test]
    fn test_reingest_with_changed_columns() {
        let store = MemoryStore::new();
        let reporter = RecordingReporter::new();
        let v = vizier();
        v.ingest("staff", &staff(), &store, &reporter).unwrap();
        store.override_field_type("staff", "gender", FieldType::Integer).unwrap();
        store.override_field_type("staff", "id", FieldType::String).unwrap();

        let next = DataTable::from_rows(
            &["code", "gender"],
            &[&["7", "male"], &["8", "female"], &["9", "male"]],
        );
        let analysis = v.ingest("staff", &next, &store, &reporter).unwrap();

        assert_eq!(analysis.fields.len(), analysis.dataset.n_cols);
        assert_eq!(analysis.fields[0].name, "code");
        assert!(!analysis.fields[0].manual);
        assert_eq!(analysis.fields[1].field_type(), FieldType::Integer);
        for spec in &analysis.specs {
            let distinct: std::collections::HashSet<_> = spec.field_ids.iter().collect();
            assert_eq!(distinct.len(), spec.field_ids.len());
            assert!(spec.field_ids.iter().all(|id| *id < 2));
        }
        assert_eq!(store.field_properties("staff").unwrap().len(), 2);
    }
}
