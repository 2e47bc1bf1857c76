mod error;
pub mod vocab;

pub use error::*;

// Re-export some oxrdf types.
pub use oxrdf::{
    BlankNode, BlankNodeRef, Graph, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef,
    Quad, Subject, SubjectRef, Term, TermRef, Triple, TripleRef, Variable, VariableRef,
};
