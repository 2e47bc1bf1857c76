use std::fmt::{Display, Formatter};
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// A light-weight result, mainly used while evaluating SPARQL expressions.
pub type ThinResult<T> = Result<T, ThinError>;

/// A thin error type that indicates an *expected* failure without any reason.
///
/// In SPARQL, many operations can fail. For example, `REGEX` applied to an IRI or a comparison of
/// two incomparable literals. These errors are part of the query evaluation and are all treated
/// equally (a filter simply rejects the solution), so we do not need to store a reason.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
pub struct ThinError {}

impl ThinError {
    /// Creates a result with a [ThinError].
    pub fn expected<T>() -> ThinResult<T> {
        Err(ThinError::default())
    }
}

impl Display for ThinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("An expected error occurred.")
    }
}

macro_rules! implement_from {
    ($t:ty) => {
        impl From<$t> for ThinError {
            fn from(_: $t) -> Self {
                ThinError::default()
            }
        }
    };
}

implement_from!(ParseIntError);
implement_from!(ParseFloatError);
implement_from!(regex::Error);
