use spargebra::SparqlSyntaxError;

/// A SPARQL evaluation error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    /// An error in SPARQL parsing.
    #[error(transparent)]
    Parsing(#[from] SparqlSyntaxError),
    /// Only `SELECT` queries produce solutions that can be inspected.
    #[error("Only SELECT queries are supported, found a {0} query")]
    UnsupportedQueryForm(&'static str),
    #[error("A feature has not yet been implemented: {0}")]
    NotImplemented(String),
}

impl QueryEvaluationError {
    pub fn not_implemented<T>(cause: impl Into<String>) -> Result<T, Self> {
        Err(QueryEvaluationError::NotImplemented(cause.into()))
    }
}
