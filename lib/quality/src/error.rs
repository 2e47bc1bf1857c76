use edm_quality_model::IriParseError;
use oxrdfio::RdfParseError;
use std::io;
use std::path::PathBuf;

/// An error that stops an assessment step.
///
/// Problems with individual fragments or metric queries are not reported through this type. They
/// are collected in the respective outcome instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QualityError {
    /// An error raised while reading or writing.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A file or directory could not be accessed.
    #[error("Failed to access '{}': {source}", path.display())]
    Path {
        /// The path that was accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// An error raised while parsing a merged graph.
    #[error(transparent)]
    Parsing(#[from] RdfParseError),
    /// An invalid IRI in the field schema or the serializer prefixes.
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
    /// An error raised while writing a report.
    #[error(transparent)]
    Report(#[from] csv::Error),
    /// The field schema document is not valid JSON or does not have the expected structure.
    #[error(transparent)]
    SchemaFormat(#[from] serde_json::Error),
    /// The field schema is structurally valid but unusable.
    #[error("Invalid field schema: {0}")]
    InvalidSchema(String),
    /// The external shape validator could not produce a verdict.
    #[error("Shape validation failed: {0}")]
    ShapeValidation(String),
}

impl QualityError {
    pub(crate) fn path(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Path { path, source }
    }
}

/// A fragment that was skipped because it could not be read or parsed.
#[derive(Debug, thiserror::Error)]
#[error("Skipped fragment '{fragment}': {source}")]
pub struct FragmentError {
    /// The name of the fragment.
    pub fragment: String,
    #[source]
    pub source: RdfParseError,
}
