//! A small SPARQL `SELECT` evaluator that runs directly on an in-memory [Graph].
//!
//! Queries are parsed with [spargebra] and the resulting algebra is evaluated bottom-up with
//! nested-loop joins. This is sufficient for the aggregate quality queries run over a harvested
//! collection and keeps the evaluation synchronous and free of any storage layer.
//!
//! ```
//! use edm_quality_model::{Graph, NamedNodeRef, TripleRef};
//! use edm_quality_sparql::QueryEvaluator;
//!
//! let mut graph = Graph::new();
//! let ex = NamedNodeRef::new_unchecked("http://example.com/s");
//! graph.insert(TripleRef::new(ex, ex, ex));
//!
//! let solutions = QueryEvaluator::new(&graph)
//!     .evaluate_str("SELECT (COUNT(*) AS ?count) WHERE { ?s ?p ?o }")
//!     .unwrap();
//! assert_eq!(solutions.len(), 1);
//! ```
//!
//! [Graph]: edm_quality_model::Graph

mod error;
mod eval;
mod expression;
mod solution;
mod support;

pub use error::QueryEvaluationError;
pub use eval::QueryEvaluator;
pub use solution::{QuerySolutions, Solution};
pub use spargebra::{Query, SparqlSyntaxError};
