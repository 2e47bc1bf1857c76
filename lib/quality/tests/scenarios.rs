#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use assert_fs::prelude::*;
use assert_fs::TempDir;
use edm_quality::completeness::{CompletenessScorer, QualityTier};
use edm_quality::merge::{merge_graphs, read_turtle, write_turtle, GraphMerger};
use edm_quality::metrics::{MetricQuery, MetricValue, MetricsEvaluator};
use edm_quality::queries::standard_queries;
use edm_quality::shapes::{ShapeValidationOptions, ShapeValidationReport, ShapeValidator};
use edm_quality::store::Fragment;
use edm_quality::{assess, AssessmentConfig, FieldSchema, QualityError};
use edm_quality_model::vocab::{dc, edm, ore};
use edm_quality_model::{Graph, LiteralRef, NamedNode, NamedNodeRef, Subject, TripleRef};
use oxrdfio::RdfFormat;
use std::error::Error;
use std::fs;
use std::path::Path;

const RECORD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:edm="http://www.europeana.eu/schemas/edm/"
         xmlns:ore="http://www.openarchives.org/ore/terms/">
  <edm:ProvidedCHO rdf:about="http://data.europeana.eu/item/1/a"/>
  <ore:Proxy rdf:about="http://data.europeana.eu/proxy/provider/1/a">
    <dc:title>Portrait of a Lady</dc:title>
    <dc:creator>Unknown</dc:creator>
    <dc:language>en</dc:language>
    <dc:type>IMAGE</dc:type>
    <dc:date>1890</dc:date>
    <edm:europeanaProxy>false</edm:europeanaProxy>
    <ore:proxyIn rdf:resource="http://data.europeana.eu/aggregation/provider/1/a"/>
  </ore:Proxy>
  <ore:Aggregation rdf:about="http://data.europeana.eu/aggregation/provider/1/a">
    <edm:aggregatedCHO rdf:resource="http://data.europeana.eu/item/1/a"/>
    <edm:dataProvider>Rijksmuseum</edm:dataProvider>
    <edm:provider>Europeana Foundation</edm:provider>
    <edm:country>Netherlands</edm:country>
    <edm:rights rdf:resource="http://rightsstatements.org/vocab/InC/1.0/"/>
    <edm:isShownBy rdf:resource="http://example.com/images/a.jpg"/>
  </ore:Aggregation>
</rdf:RDF>
"#;

const MALFORMED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="http://data.europeana.eu/proxy/provider/1/b">
    <dc:title>Landscape</dc:description>
  </rdf:Description>
</rdf:RDF>
"#;

fn proxy(graph: &mut Graph, iri: &str) -> NamedNode {
    let proxy = NamedNode::new_unchecked(iri);
    graph.insert(TripleRef::new(
        &proxy,
        edm::EUROPEANA_PROXY,
        LiteralRef::new_simple_literal("false"),
    ));
    proxy
}

#[test]
fn whitespace_identifiers_collapse_into_one_statement() {
    let object = NamedNodeRef::new_unchecked("http://data.europeana.eu/item/1/a");
    let mut clean = Graph::new();
    clean.insert(TripleRef::new(
        NamedNodeRef::new_unchecked("http://data.europeana.eu/proxy/provider/1/a"),
        ore::PROXY_FOR,
        object,
    ));
    let mut dirty = Graph::new();
    dirty.insert(TripleRef::new(
        NamedNodeRef::new_unchecked("http://data.europeana.eu/proxy/provider/1/a "),
        ore::PROXY_FOR,
        object,
    ));

    let outcome = merge_graphs([&clean, &dirty]);

    assert_eq!(outcome.graph.len(), 1);
    assert!(outcome.repaired >= 1);
    for triple in &outcome.graph {
        assert_eq!(triple.subject.to_string().trim(), triple.subject.to_string());
        assert!(!triple.subject.to_string().contains(" >"));
    }
}

#[test]
fn parsed_whitespace_identifiers_collapse_into_one_statement() -> Result<(), Box<dyn Error>> {
    let rdf_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ore="http://www.openarchives.org/ore/terms/">
  <rdf:Description rdf:about="http://data.europeana.eu/proxy/provider/1/a ">
    <ore:proxyFor rdf:resource=" http://data.europeana.eu/item/1/a"/>
  </rdf:Description>
</rdf:RDF>
"#;
    let turtle = "<http://data.europeana.eu/proxy/provider/1/a> \
        <http://www.openarchives.org/ore/terms/proxyFor> \
        <http://data.europeana.eu/item/1/a> .";
    let fragments = [
        Fragment::from_bytes("1_a.rdf", RdfFormat::RdfXml, rdf_xml),
        Fragment::from_bytes("1_a.ttl", RdfFormat::Turtle, turtle),
    ];

    let outcome = GraphMerger::new().merge(&fragments);

    assert_eq!(outcome.parsed, 2);
    assert!(outcome.skipped.is_empty());
    assert!(outcome.repaired >= 1);
    assert_eq!(outcome.unrepairable, 0);
    assert_eq!(outcome.graph.len(), 1);
    assert!(outcome.graph.contains(TripleRef::new(
        NamedNodeRef::new("http://data.europeana.eu/proxy/provider/1/a")?,
        ore::PROXY_FOR,
        NamedNodeRef::new("http://data.europeana.eu/item/1/a")?,
    )));
    Ok(())
}

#[test]
fn merged_graph_with_invalid_identifiers_reads_back() -> Result<(), Box<dyn Error>> {
    let rdf_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:edm="http://www.europeana.eu/schemas/edm/">
  <rdf:Description rdf:about="http://data.europeana.eu/aggregation/provider/1/a">
    <edm:isShownBy rdf:resource="http://example.com/images/a b.jpg"/>
    <edm:provider>Europeana Foundation</edm:provider>
  </rdf:Description>
</rdf:RDF>
"#;
    let fragment = Fragment::from_bytes("1_a.rdf", RdfFormat::RdfXml, rdf_xml);

    let outcome = GraphMerger::new().merge([&fragment]);

    assert_eq!(outcome.parsed, 1);
    assert_eq!(outcome.unrepairable, 1);
    assert_eq!(outcome.graph.len(), 1);
    let turtle = write_turtle(&outcome.graph, Vec::new())?;
    assert_eq!(read_turtle(turtle.as_slice())?, outcome.graph);
    Ok(())
}

#[test]
fn record_without_aggregation_counts_all_aggregation_fields_as_missing() {
    let mut graph = Graph::new();
    let record = proxy(&mut graph, "http://data.europeana.eu/proxy/provider/2/b");
    for predicate in [dc::TITLE, dc::CREATOR, dc::DESCRIPTION] {
        graph.insert(TripleRef::new(
            &record,
            predicate,
            LiteralRef::new_simple_literal("value"),
        ));
    }

    let schema = FieldSchema::edm();
    let report = CompletenessScorer::new(&schema).score(&graph);

    assert_eq!(report.len(), 1);
    let row = &report.records[0];
    assert_eq!((row.filled, row.total), (3, 11));
    assert_eq!(row.tier, QualityTier::Tier3);
    assert_eq!(row.linked_aggregations, 0);
    assert_eq!(
        row.missing,
        [
            "language",
            "type",
            "year",
            "dataProvider",
            "provider",
            "country",
            "rights",
            "isShownBy"
        ]
    );
}

#[test]
fn multiple_aggregations_are_reported() {
    let mut graph = Graph::new();
    let record = proxy(&mut graph, "http://data.europeana.eu/proxy/provider/3/c");
    let first = NamedNodeRef::new_unchecked("http://data.europeana.eu/aggregation/3/c1");
    let second = NamedNodeRef::new_unchecked("http://data.europeana.eu/aggregation/3/c2");
    graph.insert(TripleRef::new(&record, ore::PROXY_IN, second));
    graph.insert(TripleRef::new(&record, ore::PROXY_IN, first));
    graph.insert(TripleRef::new(
        first,
        edm::PROVIDER,
        LiteralRef::new_simple_literal("Europeana Foundation"),
    ));

    let schema = FieldSchema::edm();
    let report = CompletenessScorer::new(&schema).score(&graph);

    assert_eq!(report.len(), 1);
    assert_eq!(report.irregular_aggregation_links(), 1);
    let row = &report.records[0];
    assert_eq!(row.record, Subject::from(record));
    assert_eq!(row.linked_aggregations, 2);
    assert_eq!(row.filled, 1);
    assert!(!row.missing.contains(&"provider".to_owned()));
}

#[test]
fn invalid_language_codes_are_flagged() {
    let mut graph = Graph::new();
    for (iri, language) in [
        ("http://data.europeana.eu/proxy/provider/4/a", "ENG"),
        ("http://data.europeana.eu/proxy/provider/4/b", "en"),
    ] {
        let record = proxy(&mut graph, iri);
        graph.insert(TripleRef::new(
            &record,
            dc::LANGUAGE,
            LiteralRef::new_simple_literal(language),
        ));
    }

    let report = MetricsEvaluator::new().evaluate(&graph);

    assert_eq!(
        report.get("invalid_language_codes"),
        Some(&MetricValue::Scalar(1))
    );
}

#[test]
fn consistency_checks_follow_the_enumerations() {
    let mut graph = Graph::new();
    let a = proxy(&mut graph, "http://data.europeana.eu/proxy/provider/5/a");
    let b = proxy(&mut graph, "http://data.europeana.eu/proxy/provider/5/b");
    graph.insert(TripleRef::new(&a, dc::TYPE, LiteralRef::new_simple_literal("IMAGE")));
    graph.insert(TripleRef::new(&b, dc::TYPE, LiteralRef::new_simple_literal("Painting")));
    graph.insert(TripleRef::new(
        &a,
        edm::RIGHTS,
        NamedNodeRef::new_unchecked("http://creativecommons.org/publicdomain/mark/1.0/"),
    ));
    graph.insert(TripleRef::new(
        &b,
        edm::RIGHTS,
        LiteralRef::new_simple_literal("All rights reserved"),
    ));

    let report = MetricsEvaluator::new().evaluate(&graph);

    assert_eq!(report.get("nonstandard_dc_type"), Some(&MetricValue::Scalar(1)));
    assert_eq!(report.get("invalid_rights_uris"), Some(&MetricValue::Scalar(1)));
    assert_eq!(report.get("missing_rights"), Some(&MetricValue::Scalar(0)));
}

#[test]
fn empty_graph_reports_zero_for_every_metric() {
    let graph = Graph::new();

    let schema = FieldSchema::edm();
    assert!(CompletenessScorer::new(&schema).score(&graph).is_empty());

    let report = MetricsEvaluator::new().evaluate(&graph);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.metrics.len(), standard_queries().len());
    for metric in &report.metrics {
        match &metric.value {
            MetricValue::Scalar(count) => assert_eq!(*count, 0, "{}", metric.name),
            MetricValue::Distribution(entries) => assert!(entries.is_empty(), "{}", metric.name),
        }
    }
    assert_eq!(report.rows().len(), 10);
}

#[test]
fn malformed_metric_query_does_not_stop_the_batch() {
    let mut graph = Graph::new();
    proxy(&mut graph, "http://data.europeana.eu/proxy/provider/6/a");
    let mut queries = standard_queries();
    queries.insert(
        1,
        MetricQuery::scalar("broken", "SELECT (COUNT(* AS ?count) WHERE { ?s ?p ?o }"),
    );

    let report = MetricsEvaluator::with_queries(queries).evaluate(&graph);

    assert_eq!(report.get("broken"), Some(&MetricValue::Scalar(0)));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].metric, "broken");
    assert_eq!(report.get("missing_title"), Some(&MetricValue::Scalar(1)));
    assert_eq!(report.get("missing_creator"), Some(&MetricValue::Scalar(1)));
}

struct FixedValidator(bool);

impl ShapeValidator for FixedValidator {
    fn validate(
        &self,
        data: &Path,
        _shapes: &Path,
        _options: &ShapeValidationOptions,
    ) -> Result<ShapeValidationReport, QualityError> {
        assert!(data.exists());
        Ok(ShapeValidationReport {
            conforms: self.0,
            report_text: String::new(),
        })
    }
}

#[test]
fn assessment_writes_graph_and_reports() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let fragments = dir.child("harvested");
    fragments.child("1_a.rdf").write_str(RECORD)?;
    fragments.child("1_b.rdf").write_str(MALFORMED)?;
    fragments.child("ids.txt").write_str("/1/a\n/1/b\n")?;
    let shapes = dir.child("shapes.ttl");
    shapes.write_str("")?;

    let config = AssessmentConfig::new(
        fragments.path(),
        dir.child("merged/merged.ttl").path(),
        dir.child("results").path(),
    )
    .with_shapes(shapes.path());
    let summary = assess(&config, Some(&FixedValidator(true)))?;

    assert_eq!(summary.fragments_parsed, 1);
    assert_eq!(summary.fragments_skipped, 1);
    assert_eq!(summary.unrepairable_statements, 0);
    assert_eq!(summary.records, 1);
    assert_eq!(summary.irregular_aggregation_links, 0);
    assert_eq!(summary.tier_counts[&QualityTier::Tier1], 1);
    assert_eq!(summary.metric_failures, 0);
    assert_eq!(summary.shape_conformance, Some(true));

    let merged = read_turtle(fs::File::open(&config.merged_graph)?)?;
    assert_eq!(merged.len(), summary.statements);

    let completeness = fs::read_to_string(&summary.completeness_report)?;
    assert!(completeness
        .starts_with("record_uri,filled_fields,total_fields,tier,missing_fields\n"));
    assert!(completeness.contains(
        "http://data.europeana.eu/proxy/provider/1/a,10,11,Tier 1 (>=75%),description\n"
    ));
    let metrics = fs::read_to_string(&summary.metrics_report)?;
    assert!(metrics.starts_with("metric,value\n"));
    assert!(metrics.contains("languages_distribution:en,1\n"));
    assert!(metrics.contains("missing_aggregation,0\n"));
    Ok(())
}

#[test]
fn assessment_of_an_empty_harvest_succeeds() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let fragments = dir.child("harvested");
    fragments.create_dir_all()?;

    let config = AssessmentConfig::new(
        fragments.path(),
        dir.child("merged.ttl").path(),
        dir.child("results").path(),
    );
    let summary = assess(&config, None)?;

    assert_eq!(summary.fragments_parsed, 0);
    assert_eq!(summary.statements, 0);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.shape_conformance, None);
    assert_eq!(
        fs::read_to_string(&summary.completeness_report)?,
        "record_uri,filled_fields,total_fields,tier,missing_fields\n"
    );
    Ok(())
}
