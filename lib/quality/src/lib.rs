//! Metadata quality assessment for harvested Europeana Data Model (EDM) records.
//!
//! The harvest produces one small RDF document per record. This crate merges them into a single
//! graph while repairing identifiers with surrounding whitespace, scores each description record
//! against a [FieldSchema], and evaluates a battery of SPARQL metrics over the merged graph.
//!
//! ```
//! use edm_quality::completeness::CompletenessScorer;
//! use edm_quality::merge::GraphMerger;
//! use edm_quality::metrics::{MetricValue, MetricsEvaluator};
//! use edm_quality::schema::FieldSchema;
//! use edm_quality::store::Fragment;
//! use oxrdfio::RdfFormat;
//!
//! let fragment = Fragment::from_bytes(
//!     "record.ttl",
//!     RdfFormat::Turtle,
//!     r#"<http://example.com/proxy> <http://www.europeana.eu/schemas/edm/europeanaProxy> "false" ;
//!            <http://purl.org/dc/elements/1.1/title> "Portrait" ."#,
//! );
//! let merged = GraphMerger::new().merge([&fragment]);
//!
//! let schema = FieldSchema::edm();
//! let completeness = CompletenessScorer::new(&schema).score(&merged.graph);
//! assert_eq!(completeness.records[0].filled, 1);
//!
//! let metrics = MetricsEvaluator::new().evaluate(&merged.graph);
//! assert_eq!(metrics.get("missing_title"), Some(&MetricValue::Scalar(0)));
//! ```

mod assess;
pub mod completeness;
mod error;
pub mod merge;
pub mod metrics;
pub mod queries;
pub mod report;
pub mod sanitize;
pub mod schema;
pub mod shapes;
pub mod store;

pub use assess::{assess, AssessmentConfig, AssessmentSummary};
pub use error::{FragmentError, QualityError};
pub use schema::{FieldSchema, FieldSpec};
