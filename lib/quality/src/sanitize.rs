//! Repairs resource identifiers that carry leading or trailing whitespace.
//!
//! Literals and blank nodes are never altered. Identifiers that are still invalid after trimming
//! are detected by [is_well_formed].

use edm_quality_model::{
    Literal, NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef, Triple, TripleRef,
};

/// Returns `node` without surrounding whitespace.
pub fn clean_named_node(node: NamedNodeRef<'_>) -> NamedNode {
    let iri = node.as_str();
    let trimmed = iri.trim();
    if trimmed.len() == iri.len() {
        node.into_owned()
    } else {
        NamedNode::new_unchecked(trimmed)
    }
}

pub fn clean_subject(subject: SubjectRef<'_>) -> Subject {
    match subject {
        SubjectRef::NamedNode(node) => clean_named_node(node).into(),
        subject => subject.into_owned(),
    }
}

pub fn clean_term(term: TermRef<'_>) -> Term {
    match term {
        TermRef::NamedNode(node) => clean_named_node(node).into(),
        term => term.into_owned(),
    }
}

/// Sanitizes all three positions of `triple`.
///
/// The flag is `true` if at least one position changed.
pub fn clean_triple(triple: TripleRef<'_>) -> (Triple, bool) {
    let cleaned = Triple::new(
        clean_subject(triple.subject),
        clean_named_node(triple.predicate),
        clean_term(triple.object),
    );
    let changed = cleaned.as_ref() != triple;
    (cleaned, changed)
}

/// Returns `true` if every IRI of `triple` is valid and its language tag, if any, is well-formed.
///
/// Statements read without validation may fail this check even after [clean_triple], e.g. an IRI
/// with a space in the middle.
pub fn is_well_formed(triple: TripleRef<'_>) -> bool {
    let subject = match triple.subject {
        SubjectRef::NamedNode(node) => is_valid_iri(node),
        _ => true,
    };
    let object = match triple.object {
        TermRef::NamedNode(node) => is_valid_iri(node),
        TermRef::Literal(literal) => match literal.language() {
            Some(language) => {
                Literal::new_language_tagged_literal(literal.value(), language).is_ok()
            }
            None => is_valid_iri(literal.datatype()),
        },
        _ => true,
    };
    subject && is_valid_iri(triple.predicate) && object
}

fn is_valid_iri(node: NamedNodeRef<'_>) -> bool {
    NamedNode::new(node.as_str()).is_ok()
}
