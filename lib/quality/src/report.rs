//! Tabular reports written next to the merged graph.

use crate::completeness::CompletenessReport;
use crate::metrics::MetricsReport;
use crate::QualityError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const COMPLETENESS_REPORT_FILE: &str = "validation_results.csv";
pub const METRICS_REPORT_FILE: &str = "sparql_metrics.csv";

/// A report that can be written to a reports directory.
pub trait QualityReport {
    /// Writes the report into `output_dir` and returns the path of the written file.
    fn write_results(&self, output_dir: &Path) -> Result<PathBuf, QualityError>;
}

/// Writes one row per record.
///
/// The missing fields are joined into a single column.
pub fn write_completeness_csv<W: Write>(
    report: &CompletenessReport,
    writer: W,
) -> Result<(), QualityError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "record_uri",
        "filled_fields",
        "total_fields",
        "tier",
        "missing_fields",
    ])?;
    for record in &report.records {
        writer.write_record([
            record.record_id(),
            record.filled.to_string(),
            record.total.to_string(),
            record.tier.label().to_owned(),
            record.missing.join(", "),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_metrics_csv<W: Write>(report: &MetricsReport, writer: W) -> Result<(), QualityError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["metric", "value"])?;
    for (metric, value) in report.rows() {
        writer.write_record([metric, value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File, QualityError> {
    File::create(path).map_err(QualityError::path(path))
}

impl QualityReport for CompletenessReport {
    fn write_results(&self, output_dir: &Path) -> Result<PathBuf, QualityError> {
        let path = output_dir.join(COMPLETENESS_REPORT_FILE);
        write_completeness_csv(self, create(&path)?)?;
        Ok(path)
    }
}

impl QualityReport for MetricsReport {
    fn write_results(&self, output_dir: &Path) -> Result<PathBuf, QualityError> {
        let path = output_dir.join(METRICS_REPORT_FILE);
        write_metrics_csv(self, create(&path)?)?;
        Ok(path)
    }
}
