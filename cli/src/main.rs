use crate::cli::{Args, Command, SchemaArgs, ShapeArgs};
use anyhow::{bail, Context};
use clap::Parser;
use edm_quality::completeness::{CompletenessReport, CompletenessScorer, QualityTier};
use edm_quality::merge::{read_turtle, write_turtle, GraphMerger, MergeOutcome};
use edm_quality::metrics::{MetricValue, MetricsEvaluator, MetricsReport};
use edm_quality::report::{write_completeness_csv, write_metrics_csv};
use edm_quality::shapes::{CommandValidator, ShapeValidationOptions, ShapeValidator};
use edm_quality::store::FragmentStore;
use edm_quality::{assess, AssessmentConfig, AssessmentSummary, FieldSchema};
use edm_quality_model::Graph;
use prettytable::{row, Table};
use std::fs::File;
use std::io::{self, stdout, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::prelude::*;

mod cli;

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edm_quality=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let matches = Args::parse();
    match matches.command {
        Command::Merge {
            fragments,
            output,
            strict,
        } => {
            let store = FragmentStore::open(&fragments)?;
            let merger = if strict {
                GraphMerger::new().strict()
            } else {
                GraphMerger::new()
            };
            let outcome = merger.merge(store.fragments());
            write_graph(&outcome.graph, &output)?;
            print_merge_summary(&outcome)
        }
        Command::Score {
            graph,
            schema,
            output,
        } => {
            let schema = load_schema(&schema)?;
            let graph = load_graph(&graph)?;
            let report = CompletenessScorer::new(&schema).score(&graph);
            if let Some(output) = output {
                write_completeness_csv(&report, create_file(&output)?)?;
                info!("Wrote completeness report to {}", output.display());
                print_completeness_summary(&report)
            } else {
                Ok(write_completeness_csv(&report, stdout().lock())?)
            }
        }
        Command::Metrics { graph, output } => {
            let graph = load_graph(&graph)?;
            let report = MetricsEvaluator::new().evaluate(&graph);
            if let Some(output) = output {
                write_metrics_csv(&report, create_file(&output)?)?;
                info!("Wrote metrics report to {}", output.display());
                print_metrics_summary(&report)
            } else {
                Ok(write_metrics_csv(&report, stdout().lock())?)
            }
        }
        Command::Validate { graph, shapes } => {
            let validator = CommandValidator::new(&shapes.validator);
            let report = validator.validate(&graph, &shapes.shapes, &shape_options(&shapes))?;
            let mut stdout = stdout().lock();
            stdout.write_all(report.report_text.as_bytes())?;
            stdout.flush()?;
            if !report.conforms {
                bail!("{} does not conform to the shapes", graph.display());
            }
            Ok(())
        }
        Command::Assess {
            fragments,
            merged,
            reports,
            shapes,
            validator,
            inference,
            schema,
        } => {
            let schema = load_schema(&schema)?;
            let mut config = AssessmentConfig::new(fragments, merged, reports).with_schema(schema);
            config.shape_options.inference = inference.into();
            if let Some(shapes) = shapes {
                config = config.with_shapes(shapes);
            }
            let validator = CommandValidator::new(validator);
            let summary = assess(&config, Some(&validator))?;
            print_assessment_summary(&summary)
        }
    }
}

fn shape_options(args: &ShapeArgs) -> ShapeValidationOptions {
    ShapeValidationOptions {
        inference: args.inference.into(),
        allow_infos: !args.deny_infos,
        allow_warnings: !args.deny_warnings,
    }
}

fn load_schema(args: &SchemaArgs) -> anyhow::Result<FieldSchema> {
    let Some(path) = &args.schema else {
        return Ok(FieldSchema::edm());
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open schema file {}", path.display()))?;
    FieldSchema::from_json(BufReader::new(file))
        .with_context(|| format!("Invalid schema file {}", path.display()))
}

fn load_graph(path: &Path) -> anyhow::Result<Graph> {
    let file =
        File::open(path).with_context(|| format!("Failed to open graph {}", path.display()))?;
    let graph = read_turtle(BufReader::new(file))
        .with_context(|| format!("Failed to parse graph {}", path.display()))?;
    info!("Loaded {} statements from {}", graph.len(), path.display());
    Ok(graph)
}

fn create_file(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_graph(graph: &Graph, path: &Path) -> anyhow::Result<()> {
    write_turtle(graph, create_file(path)?)?.flush()?;
    info!("Wrote merged graph to {}", path.display());
    Ok(())
}

fn print_table(table: &Table) -> anyhow::Result<()> {
    table.print(&mut stdout().lock())?;
    Ok(())
}

fn print_merge_summary(outcome: &MergeOutcome) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.add_row(row!["Fragments parsed", outcome.parsed]);
    table.add_row(row!["Fragments skipped", outcome.skipped.len()]);
    table.add_row(row!["Repaired statements", outcome.repaired]);
    table.add_row(row!["Dropped statements", outcome.unrepairable]);
    table.add_row(row!["Statements", outcome.graph.len()]);
    print_table(&table)
}

fn print_completeness_summary(report: &CompletenessReport) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.add_row(row!["Tier", "Records"]);
    for (tier, count) in report.tier_counts() {
        table.add_row(row![tier, count]);
    }
    table.add_row(row!["Mean fill ratio", format_ratio(report.mean_fill_ratio())]);
    table.add_row(row![
        "Records without exactly one aggregation",
        report.irregular_aggregation_links()
    ]);
    print_table(&table)
}

fn print_metrics_summary(report: &MetricsReport) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.add_row(row!["Metric", "Value"]);
    for metric in &report.metrics {
        let value = match &metric.value {
            MetricValue::Scalar(count) => count.to_string(),
            MetricValue::Distribution(entries) => format!("{} distinct values", entries.len()),
        };
        table.add_row(row![metric.name, value]);
    }
    for failure in &report.failures {
        table.add_row(row![format!("{} (failed)", failure.metric), failure.error]);
    }
    print_table(&table)
}

fn print_assessment_summary(summary: &AssessmentSummary) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.add_row(row!["Fragments parsed", summary.fragments_parsed]);
    table.add_row(row!["Fragments skipped", summary.fragments_skipped]);
    table.add_row(row!["Repaired statements", summary.repaired_statements]);
    table.add_row(row!["Dropped statements", summary.unrepairable_statements]);
    table.add_row(row!["Statements", summary.statements]);
    table.add_row(row!["Records", summary.records]);
    table.add_row(row![
        "Records without exactly one aggregation",
        summary.irregular_aggregation_links
    ]);
    for tier in QualityTier::ALL {
        let count = summary.tier_counts.get(&tier).copied().unwrap_or_default();
        table.add_row(row![tier, count]);
    }
    table.add_row(row!["Mean fill ratio", format_ratio(summary.mean_fill_ratio)]);
    table.add_row(row!["Failed metric queries", summary.metric_failures]);
    let conformance = match summary.shape_conformance {
        Some(true) => "conforms",
        Some(false) => "does not conform",
        None => "-",
    };
    table.add_row(row!["Shape validation", conformance]);
    table.add_row(row![
        "Completeness report",
        summary.completeness_report.display()
    ]);
    table.add_row(row!["Metrics report", summary.metrics_report.display()]);
    print_table(&table)
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "-".to_owned(), |ratio| format!("{:.1}%", ratio * 100.0))
}
