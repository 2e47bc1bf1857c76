//! Merges record fragments into one sanitized graph.

use crate::sanitize::{clean_triple, is_well_formed};
use crate::store::Fragment;
use crate::{FragmentError, QualityError};
use edm_quality_model::vocab::PREFIXES;
use edm_quality_model::{Graph, Triple};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser, RdfSerializer};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// The result of merging fragments.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// The deduplicated union of all parsed fragments with sanitized identifiers.
    pub graph: Graph,
    /// The number of fragments that were merged.
    pub parsed: usize,
    /// The fragments that could not be parsed.
    pub skipped: Vec<FragmentError>,
    /// The number of distinct statements that had at least one identifier repaired.
    pub repaired: usize,
    /// The number of statements dropped because an identifier stayed invalid after repair.
    pub unrepairable: usize,
}

/// Parses fragments and merges them into one graph.
#[derive(Clone, Copy, Debug)]
pub struct GraphMerger {
    lenient: bool,
}

impl Default for GraphMerger {
    fn default() -> Self {
        Self { lenient: true }
    }
}

impl GraphMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects fragments with invalid IRIs instead of repairing them.
    ///
    /// By default, fragments are parsed without IRI validation so that identifiers with
    /// surrounding whitespace reach the sanitizer.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.lenient = false;
        self
    }

    /// Merges `fragments` in the given order.
    ///
    /// A fragment that fails to parse is skipped as a whole and merging continues. Blank nodes are
    /// renamed per fragment so that two fragments never share one.
    pub fn merge<'a>(&self, fragments: impl IntoIterator<Item = &'a Fragment>) -> MergeOutcome {
        let mut working = Graph::new();
        let mut parsed = 0;
        let mut skipped = Vec::new();
        for fragment in fragments {
            match self.parse(fragment) {
                Ok(graph) => {
                    debug!(
                        "Parsed fragment {} with {} statements",
                        fragment.name,
                        graph.len()
                    );
                    for triple in &graph {
                        working.insert(triple);
                    }
                    parsed += 1;
                }
                Err(source) => {
                    let error = FragmentError {
                        fragment: fragment.name.clone(),
                        source,
                    };
                    warn!("{error}");
                    skipped.push(error);
                }
            }
        }

        let sanitized = sanitize_graph(&working);
        info!(
            "Merged {parsed} fragments into {} statements, skipped {}, repaired {}, dropped {}",
            sanitized.graph.len(),
            skipped.len(),
            sanitized.repaired,
            sanitized.unrepairable
        );
        MergeOutcome {
            skipped,
            parsed,
            ..sanitized
        }
    }

    fn parse(&self, fragment: &Fragment) -> Result<Graph, RdfParseError> {
        let mut parser = RdfParser::from_format(fragment.format).rename_blank_nodes();
        if self.lenient {
            parser = parser.unchecked();
        }
        let mut graph = Graph::new();
        for quad in parser.for_reader(fragment.open()?) {
            graph.insert(&Triple::from(quad?));
        }
        Ok(graph)
    }
}

/// Merges already parsed graphs, sanitizing identifiers the same way as [GraphMerger::merge].
pub fn merge_graphs<'a>(graphs: impl IntoIterator<Item = &'a Graph>) -> MergeOutcome {
    let mut working = Graph::new();
    let mut parsed = 0;
    for graph in graphs {
        for triple in graph {
            working.insert(triple);
        }
        parsed += 1;
    }
    MergeOutcome {
        parsed,
        ..sanitize_graph(&working)
    }
}

/// Writes every statement of `graph` into a fresh graph with sanitized identifiers.
///
/// Statements that are still not well-formed are dropped and counted.
fn sanitize_graph(working: &Graph) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    for triple in working {
        let (cleaned, changed) = clean_triple(triple);
        if !is_well_formed(cleaned.as_ref()) {
            warn!("Dropping statement with an invalid identifier: {triple}");
            outcome.unrepairable += 1;
            continue;
        }
        if changed {
            outcome.repaired += 1;
        }
        outcome.graph.insert(&cleaned);
    }
    outcome
}

/// Serializes `graph` as Turtle with the EDM prefixes.
pub fn write_turtle<W: Write>(graph: &Graph, writer: W) -> Result<W, QualityError> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
    for (prefix, iri) in PREFIXES {
        serializer = serializer.with_prefix(prefix, iri)?;
    }
    let mut serializer = serializer.for_writer(writer);
    for triple in graph {
        serializer.serialize_triple(triple)?;
    }
    Ok(serializer.finish()?)
}

/// Loads a merged graph written by [write_turtle].
pub fn read_turtle(reader: impl Read) -> Result<Graph, QualityError> {
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(reader) {
        graph.insert(&Triple::from(quad?));
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_quality_model::{NamedNode, NamedNodeRef, TripleRef};

    const GOOD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="http://data.europeana.eu/proxy/provider/1/a">
    <dc:title>Portrait</dc:title>
  </rdf:Description>
</rdf:RDF>
"#;

    const MALFORMED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="http://data.europeana.eu/proxy/provider/1/b">
    <dc:title>Landscape</dc:creator>
  </rdf:Description>
</rdf:RDF>
"#;

    fn fragment(name: &str, data: &str) -> Fragment {
        Fragment::from_bytes(name, RdfFormat::RdfXml, data)
    }

    #[test]
    fn malformed_fragments_are_skipped() {
        let fragments = [fragment("a.rdf", GOOD), fragment("b.rdf", MALFORMED)];
        let outcome = GraphMerger::new().merge(&fragments);
        assert_eq!(outcome.parsed, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].fragment, "b.rdf");
        assert_eq!(outcome.graph.len(), 1);
    }

    #[test]
    fn merging_a_fragment_twice_is_idempotent() {
        let fragments = [fragment("a.rdf", GOOD), fragment("a-copy.rdf", GOOD)];
        let outcome = GraphMerger::new().merge(&fragments);
        assert_eq!(outcome.parsed, 2);
        assert_eq!(outcome.graph.len(), 1);
    }

    #[test]
    fn no_fragments_give_an_empty_graph() {
        let fragments: Vec<Fragment> = Vec::new();
        let outcome = GraphMerger::new().merge(&fragments);
        assert_eq!(outcome.parsed, 0);
        assert!(outcome.graph.is_empty());
        assert_eq!(outcome.repaired, 0);
    }

    const WHITESPACE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="http://data.europeana.eu/proxy/provider/1/a ">
    <dc:title>Portrait</dc:title>
  </rdf:Description>
</rdf:RDF>
"#;

    const INNER_SPACE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:edm="http://www.europeana.eu/schemas/edm/">
  <rdf:Description rdf:about="http://data.europeana.eu/aggregation/provider/1/a">
    <edm:isShownBy rdf:resource="http://example.com/images/a b.jpg"/>
    <edm:isShownAt rdf:resource="http://example.com/items/a"/>
  </rdf:Description>
</rdf:RDF>
"#;

    #[test]
    fn whitespace_identifiers_from_rdf_xml_are_repaired() {
        let fragments = [fragment("a.rdf", GOOD), fragment("a-space.rdf", WHITESPACE)];
        let outcome = GraphMerger::new().merge(&fragments);
        assert_eq!(outcome.parsed, 2);
        assert!(outcome.skipped.is_empty());
        assert!(outcome.repaired >= 1);
        assert_eq!(outcome.graph.len(), 1);
    }

    #[test]
    fn whitespace_identifiers_from_turtle_are_repaired() {
        let turtle = |subject: &str| {
            format!("<{subject}> <http://purl.org/dc/elements/1.1/title> \"Portrait\" .")
        };
        let fragments = [
            Fragment::from_bytes(
                "a.ttl",
                RdfFormat::Turtle,
                turtle("http://data.europeana.eu/proxy/provider/1/a"),
            ),
            Fragment::from_bytes(
                "a-space.ttl",
                RdfFormat::Turtle,
                turtle("http://data.europeana.eu/proxy/provider/1/a "),
            ),
        ];
        let outcome = GraphMerger::new().merge(&fragments);
        assert_eq!(outcome.parsed, 2);
        assert_eq!(outcome.repaired, 1);
        assert_eq!(outcome.graph.len(), 1);
    }

    #[test]
    fn strict_merging_skips_whitespace_identifiers() {
        let fragments = [fragment("a.rdf", GOOD), fragment("a-space.rdf", WHITESPACE)];
        let outcome = GraphMerger::new().strict().merge(&fragments);
        assert_eq!(outcome.parsed, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.repaired, 0);
    }

    #[test]
    fn unrepairable_statements_are_dropped() -> Result<(), QualityError> {
        let outcome = GraphMerger::new().merge([&fragment("a.rdf", INNER_SPACE)]);
        assert_eq!(outcome.parsed, 1);
        assert_eq!(outcome.unrepairable, 1);
        assert_eq!(outcome.graph.len(), 1);

        let turtle = write_turtle(&outcome.graph, Vec::new())?;
        let read = read_turtle(turtle.as_slice())?;
        assert_eq!(read, outcome.graph);
        Ok(())
    }

    #[test]
    fn turtle_output_reads_back() -> Result<(), QualityError> {
        let s = NamedNode::new_unchecked("http://example.com/s ");
        let p = NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/title");
        let mut graph = Graph::new();
        graph.insert(TripleRef::new(&s, p, &s));
        let outcome = merge_graphs([&graph]);
        assert_eq!(outcome.repaired, 1);

        let turtle = write_turtle(&outcome.graph, Vec::new())?;
        assert!(String::from_utf8_lossy(&turtle).contains("@prefix dc:"));
        let read = read_turtle(turtle.as_slice())?;
        assert_eq!(read, outcome.graph);
        Ok(())
    }
}
