use crate::completeness::{CompletenessScorer, QualityTier};
use crate::merge::{write_turtle, GraphMerger};
use crate::metrics::MetricsEvaluator;
use crate::report::QualityReport;
use crate::schema::FieldSchema;
use crate::shapes::{ShapeValidationOptions, ShapeValidator};
use crate::store::FragmentStore;
use crate::QualityError;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything an assessment run reads and writes.
#[derive(Clone, Debug)]
pub struct AssessmentConfig {
    /// The directory holding one serialized graph per harvested record.
    pub fragments: PathBuf,
    /// Where the merged Turtle graph is written.
    pub merged_graph: PathBuf,
    /// The shapes graph for the external validator. Shape validation is skipped without it.
    pub shapes: Option<PathBuf>,
    /// The directory receiving the CSV reports.
    pub reports: PathBuf,
    pub schema: FieldSchema,
    pub shape_options: ShapeValidationOptions,
}

impl AssessmentConfig {
    pub fn new(
        fragments: impl Into<PathBuf>,
        merged_graph: impl Into<PathBuf>,
        reports: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fragments: fragments.into(),
            merged_graph: merged_graph.into(),
            shapes: None,
            reports: reports.into(),
            schema: FieldSchema::default(),
            shape_options: ShapeValidationOptions::default(),
        }
    }

    #[must_use]
    pub fn with_shapes(mut self, shapes: impl Into<PathBuf>) -> Self {
        self.shapes = Some(shapes.into());
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: FieldSchema) -> Self {
        self.schema = schema;
        self
    }
}

/// What an assessment run found, for operators to judge the harvest and the records.
#[derive(Clone, Debug, PartialEq)]
pub struct AssessmentSummary {
    pub fragments_parsed: usize,
    pub fragments_skipped: usize,
    pub repaired_statements: usize,
    /// Statements dropped because an identifier could not be repaired.
    pub unrepairable_statements: usize,
    pub statements: usize,
    pub records: usize,
    /// Records linked to no aggregation or to more than one.
    pub irregular_aggregation_links: usize,
    pub tier_counts: BTreeMap<QualityTier, usize>,
    pub mean_fill_ratio: Option<f64>,
    pub metric_failures: usize,
    /// `None` if no shapes were configured or the validator failed.
    pub shape_conformance: Option<bool>,
    pub completeness_report: PathBuf,
    pub metrics_report: PathBuf,
}

/// Merges the fragments, writes the merged graph, scores it and writes the reports.
///
/// Skipped fragments, failing metric queries and a failing shape validator degrade the result
/// but do not abort the run. Only I/O on the configured paths is fatal.
pub fn assess(
    config: &AssessmentConfig,
    validator: Option<&dyn ShapeValidator>,
) -> Result<AssessmentSummary, QualityError> {
    let store = FragmentStore::open(&config.fragments)?;
    info!(
        "Merging {} fragments from {}",
        store.len(),
        store.directory().display()
    );
    let merged = GraphMerger::new().merge(store.fragments());

    if let Some(parent) = config.merged_graph.parent() {
        fs::create_dir_all(parent).map_err(QualityError::path(parent))?;
    }
    let file =
        File::create(&config.merged_graph).map_err(QualityError::path(&config.merged_graph))?;
    write_turtle(&merged.graph, BufWriter::new(file))?.flush()?;
    info!("Wrote merged graph to {}", config.merged_graph.display());

    let completeness = CompletenessScorer::new(&config.schema).score(&merged.graph);
    let metrics = MetricsEvaluator::new().evaluate(&merged.graph);

    let shape_conformance = match (&config.shapes, validator) {
        (Some(shapes), Some(validator)) => {
            match validator.validate(&config.merged_graph, shapes, &config.shape_options) {
                Ok(report) => Some(report.conforms),
                Err(error) => {
                    warn!("{error}");
                    None
                }
            }
        }
        _ => None,
    };

    fs::create_dir_all(&config.reports).map_err(QualityError::path(&config.reports))?;
    let completeness_report = completeness.write_results(&config.reports)?;
    let metrics_report = metrics.write_results(&config.reports)?;
    info!("Wrote reports to {}", config.reports.display());

    Ok(AssessmentSummary {
        fragments_parsed: merged.parsed,
        fragments_skipped: merged.skipped.len(),
        repaired_statements: merged.repaired,
        unrepairable_statements: merged.unrepairable,
        statements: merged.graph.len(),
        records: completeness.len(),
        irregular_aggregation_links: completeness.irregular_aggregation_links(),
        tier_counts: completeness.tier_counts(),
        mean_fill_ratio: completeness.mean_fill_ratio(),
        metric_failures: metrics.failures.len(),
        shape_conformance,
        completeness_report,
        metrics_report,
    })
}
