//! Aggregate quality metrics computed with SPARQL queries over the merged graph.

use crate::queries::standard_queries;
use edm_quality_model::{Graph, Term};
use edm_quality_sparql::{QueryEvaluator, QuerySolutions};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    /// The first binding of the first projected variable is a count.
    Scalar,
    /// Every solution maps the first projected variable to the count in the second one.
    Distribution,
}

/// A named SPARQL `SELECT` query that computes one metric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricQuery {
    pub name: String,
    pub kind: MetricKind,
    pub sparql: String,
}

impl MetricQuery {
    pub fn new(name: impl Into<String>, kind: MetricKind, sparql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            sparql: sparql.into(),
        }
    }

    pub fn scalar(name: impl Into<String>, sparql: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Scalar, sparql)
    }

    pub fn distribution(name: impl Into<String>, sparql: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Distribution, sparql)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetricValue {
    Scalar(u64),
    /// Observed values mapped to their number of occurrences.
    Distribution(BTreeMap<String, u64>),
}

impl MetricValue {
    fn empty(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Scalar => Self::Scalar(0),
            MetricKind::Distribution => Self::Distribution(BTreeMap::new()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
}

/// A metric query that could not be evaluated. Its value is reported as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricFailure {
    pub metric: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsReport {
    pub metrics: Vec<Metric>,
    pub failures: Vec<MetricFailure>,
}

impl MetricsReport {
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics
            .iter()
            .find(|metric| metric.name == name)
            .map(|metric| &metric.value)
    }

    /// Flattens the report into `(metric, value)` rows.
    ///
    /// A scalar metric is one row named after the metric. A distribution is one row per observed
    /// value, named `metric:value`.
    pub fn rows(&self) -> Vec<(String, u64)> {
        let mut rows = Vec::new();
        for metric in &self.metrics {
            match &metric.value {
                MetricValue::Scalar(count) => rows.push((metric.name.clone(), *count)),
                MetricValue::Distribution(entries) => rows.extend(
                    entries
                        .iter()
                        .map(|(key, count)| (format!("{}:{key}", metric.name), *count)),
                ),
            }
        }
        rows
    }
}

/// Runs a battery of metric queries.
#[derive(Clone, Debug)]
pub struct MetricsEvaluator {
    queries: Vec<MetricQuery>,
}

impl Default for MetricsEvaluator {
    fn default() -> Self {
        Self::with_queries(standard_queries())
    }
}

impl MetricsEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queries(queries: impl IntoIterator<Item = MetricQuery>) -> Self {
        Self {
            queries: queries.into_iter().collect(),
        }
    }

    pub fn queries(&self) -> &[MetricQuery] {
        &self.queries
    }

    /// Evaluates every query against `graph`.
    ///
    /// A query that fails is reported in [MetricsReport::failures] with a zero value and does not
    /// stop the remaining queries.
    pub fn evaluate(&self, graph: &Graph) -> MetricsReport {
        let evaluator = QueryEvaluator::new(graph);
        let mut report = MetricsReport::default();
        for query in &self.queries {
            let value = match evaluator.evaluate_str(&query.sparql) {
                Ok(solutions) => metric_value(query.kind, &solutions),
                Err(error) => {
                    warn!("Metric query {} failed: {error}", query.name);
                    report.failures.push(MetricFailure {
                        metric: query.name.clone(),
                        error: error.to_string(),
                    });
                    MetricValue::empty(query.kind)
                }
            };
            match &value {
                MetricValue::Scalar(count) => debug!("{}: {count}", query.name),
                MetricValue::Distribution(entries) => {
                    debug!("{}: {} entries", query.name, entries.len());
                }
            }
            report.metrics.push(Metric {
                name: query.name.clone(),
                value,
            });
        }
        info!(
            "Computed {} metrics, {} failed",
            report.metrics.len(),
            report.failures.len()
        );
        report
    }
}

fn metric_value(kind: MetricKind, solutions: &QuerySolutions) -> MetricValue {
    match kind {
        MetricKind::Scalar => MetricValue::Scalar(
            solutions
                .row(0)
                .and_then(|row| row.first().copied().flatten().and_then(count_value))
                .unwrap_or(0),
        ),
        MetricKind::Distribution => {
            let mut entries = BTreeMap::new();
            for index in 0..solutions.len() {
                let Some(row) = solutions.row(index) else {
                    continue;
                };
                if let [Some(key), Some(count), ..] = row.as_slice() {
                    if let Some(count) = count_value(count) {
                        *entries.entry(key_value(key)).or_default() += count;
                    }
                }
            }
            MetricValue::Distribution(entries)
        }
    }
}

fn count_value(term: &Term) -> Option<u64> {
    match term {
        Term::Literal(literal) => literal.value().parse().ok(),
        _ => None,
    }
}

/// The string form of a distribution key: the IRI, the lexical form or the blank node label.
fn key_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_owned(),
        Term::BlankNode(node) => node.as_str().to_owned(),
        Term::Literal(literal) => literal.value().to_owned(),
        #[allow(unreachable_patterns)]
        term => term.to_string(),
    }
}
