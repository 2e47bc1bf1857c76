//! Scores every description record against a [FieldSchema].

use crate::schema::{FieldSchema, FieldSpec};
use edm_quality_model::vocab::{edm, ore};
use edm_quality_model::{Graph, LiteralRef, Subject, SubjectRef, TermRef};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// An ordinal classification of a record's fill ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl QualityTier {
    pub const ALL: [Self; 4] = [Self::Tier1, Self::Tier2, Self::Tier3, Self::Tier4];

    /// Each tier includes its lower bound.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.75 {
            Self::Tier1
        } else if ratio >= 0.50 {
            Self::Tier2
        } else if ratio >= 0.25 {
            Self::Tier3
        } else {
            Self::Tier4
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "Tier 1 (>=75%)",
            Self::Tier2 => "Tier 2 (>=50%)",
            Self::Tier3 => "Tier 3 (>=25%)",
            Self::Tier4 => "Tier 4 (<25%)",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The completeness of a single description record.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordReport {
    pub record: Subject,
    pub filled: usize,
    pub total: usize,
    pub tier: QualityTier,
    /// Names of the absent fields in schema order, record-level fields first.
    pub missing: Vec<String>,
    /// How many aggregations the record is linked to. Anything but one is a data problem.
    pub linked_aggregations: usize,
}

impl RecordReport {
    /// The share of filled fields, `0` for an empty schema.
    pub fn fill_ratio(&self) -> f64 {
        fill_ratio(self.filled, self.total)
    }

    /// The record identifier without angle brackets.
    pub fn record_id(&self) -> String {
        match &self.record {
            Subject::NamedNode(node) => node.as_str().to_owned(),
            record => record.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletenessReport {
    pub records: Vec<RecordReport>,
}

impl CompletenessReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The number of records per tier, including empty tiers.
    pub fn tier_counts(&self) -> BTreeMap<QualityTier, usize> {
        let mut counts: BTreeMap<_, _> = QualityTier::ALL.iter().map(|tier| (*tier, 0)).collect();
        for record in &self.records {
            *counts.entry(record.tier).or_default() += 1;
        }
        counts
    }

    /// The number of records not linked to exactly one aggregation.
    pub fn irregular_aggregation_links(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.linked_aggregations != 1)
            .count()
    }

    /// The mean fill ratio, `None` if there are no records.
    pub fn mean_fill_ratio(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(RecordReport::fill_ratio).sum();
        Some(sum / self.records.len() as f64)
    }
}

fn fill_ratio(filled: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        filled as f64 / total as f64
    }
}

/// Returns the description records of `graph`, sorted by identifier.
///
/// These are the provider proxies, flagged with `edm:europeanaProxy "false"`.
pub fn description_records(graph: &Graph) -> Vec<Subject> {
    graph
        .subjects_for_predicate_object(
            edm::EUROPEANA_PROXY,
            LiteralRef::new_simple_literal("false"),
        )
        .map(SubjectRef::into_owned)
        .sorted_by_cached_key(ToString::to_string)
        .collect()
}

/// Returns the aggregations a record belongs to through `ore:proxyIn`, sorted by identifier.
fn linked_aggregations(graph: &Graph, record: SubjectRef<'_>) -> Vec<Subject> {
    graph
        .objects_for_subject_predicate(record, ore::PROXY_IN)
        .filter_map(|object| match object {
            TermRef::NamedNode(node) => Some(Subject::from(node.into_owned())),
            TermRef::BlankNode(node) => Some(Subject::from(node.into_owned())),
            _ => None,
        })
        .sorted_by_cached_key(ToString::to_string)
        .collect()
}

pub struct CompletenessScorer<'schema> {
    schema: &'schema FieldSchema,
}

impl<'schema> CompletenessScorer<'schema> {
    pub fn new(schema: &'schema FieldSchema) -> Self {
        Self { schema }
    }

    pub fn score(&self, graph: &Graph) -> CompletenessReport {
        let records: Vec<_> = description_records(graph)
            .iter()
            .map(|record| self.score_record(graph, record.as_ref()))
            .collect();
        info!("Scored {} description records", records.len());
        CompletenessReport { records }
    }

    /// Scores one record.
    ///
    /// Without a linked aggregation every aggregation-level field counts as missing. With more
    /// than one, the aggregation with the smallest identifier is used.
    pub fn score_record(&self, graph: &Graph, record: SubjectRef<'_>) -> RecordReport {
        let mut filled = 0;
        let mut missing = Vec::new();
        let mut check = |field: &FieldSpec, subject: Option<SubjectRef<'_>>| {
            if subject.is_some_and(|subject| field.is_filled(graph, subject)) {
                filled += 1;
            } else {
                missing.push(field.name.clone());
            }
        };

        for field in &self.schema.record_fields {
            check(field, Some(record));
        }
        let aggregations = linked_aggregations(graph, record);
        if aggregations.len() > 1 {
            warn!(
                "Record {record} is linked to {} aggregations, using {}",
                aggregations.len(),
                aggregations[0]
            );
        }
        let aggregation = aggregations.first().map(Subject::as_ref);
        for field in &self.schema.aggregation_fields {
            check(field, aggregation);
        }

        let total = self.schema.total_fields();
        let tier = QualityTier::from_ratio(fill_ratio(filled, total));
        debug!("Record {record} has {filled} of {total} fields, {tier}");
        RecordReport {
            record: record.into_owned(),
            filled,
            total,
            tier,
            missing,
            linked_aggregations: aggregations.len(),
        }
    }
}
