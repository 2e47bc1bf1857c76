use crate::eval::{integer, QueryEvaluator};
use crate::solution::Solution;
use edm_quality_model::vocab::{rdf, xsd};
use edm_quality_model::{Literal, NamedNodeRef, Term, ThinError, ThinResult};
use spargebra::algebra::{Expression, Function};
use std::cmp::Ordering;

const NUMERIC_TYPES: [NamedNodeRef<'static>; 16] = [
    xsd::INTEGER,
    xsd::DECIMAL,
    xsd::DOUBLE,
    xsd::FLOAT,
    xsd::INT,
    xsd::LONG,
    xsd::SHORT,
    xsd::BYTE,
    xsd::NON_NEGATIVE_INTEGER,
    xsd::NON_POSITIVE_INTEGER,
    xsd::POSITIVE_INTEGER,
    xsd::NEGATIVE_INTEGER,
    xsd::UNSIGNED_INT,
    xsd::UNSIGNED_LONG,
    xsd::UNSIGNED_SHORT,
    xsd::UNSIGNED_BYTE,
];

/// Evaluates SPARQL expressions against a single solution.
///
/// Every expression error is a [ThinError]. Callers decide what an error means: a `FILTER`
/// drops the solution and a `BIND` leaves the variable unbound.
pub(crate) struct ExpressionEvaluator<'eval, 'graph> {
    query: &'eval QueryEvaluator<'graph>,
    solution: &'eval Solution,
}

impl<'eval, 'graph> ExpressionEvaluator<'eval, 'graph> {
    pub(crate) fn new(query: &'eval QueryEvaluator<'graph>, solution: &'eval Solution) -> Self {
        Self { query, solution }
    }

    pub(crate) fn evaluate(&self, expression: &Expression) -> ThinResult<Term> {
        match expression {
            Expression::NamedNode(nn) => Ok(nn.clone().into()),
            Expression::Literal(literal) => Ok(literal.clone().into()),
            Expression::Variable(variable) => self
                .solution
                .get(variable)
                .cloned()
                .ok_or(ThinError::default()),
            Expression::Bound(variable) => Ok(boolean(self.solution.get(variable).is_some())),
            Expression::Not(inner) => Ok(boolean(!self.effective_boolean_value(inner)?)),
            Expression::Or(lhs, rhs) => {
                match (
                    self.effective_boolean_value(lhs),
                    self.effective_boolean_value(rhs),
                ) {
                    (Ok(true), _) | (_, Ok(true)) => Ok(boolean(true)),
                    (Ok(false), Ok(false)) => Ok(boolean(false)),
                    _ => ThinError::expected(),
                }
            }
            Expression::And(lhs, rhs) => {
                match (
                    self.effective_boolean_value(lhs),
                    self.effective_boolean_value(rhs),
                ) {
                    (Ok(false), _) | (_, Ok(false)) => Ok(boolean(false)),
                    (Ok(true), Ok(true)) => Ok(boolean(true)),
                    _ => ThinError::expected(),
                }
            }
            Expression::Equal(lhs, rhs) => {
                Ok(boolean(equals(&self.evaluate(lhs)?, &self.evaluate(rhs)?)?))
            }
            Expression::SameTerm(lhs, rhs) => {
                Ok(boolean(self.evaluate(lhs)? == self.evaluate(rhs)?))
            }
            Expression::Greater(lhs, rhs) => self.compare(lhs, rhs, Ordering::is_gt),
            Expression::GreaterOrEqual(lhs, rhs) => self.compare(lhs, rhs, Ordering::is_ge),
            Expression::Less(lhs, rhs) => self.compare(lhs, rhs, Ordering::is_lt),
            Expression::LessOrEqual(lhs, rhs) => self.compare(lhs, rhs, Ordering::is_le),
            Expression::In(lhs, candidates) => {
                let value = self.evaluate(lhs)?;
                let mut failed = false;
                for candidate in candidates {
                    match self
                        .evaluate(candidate)
                        .and_then(|candidate| equals(&value, &candidate))
                    {
                        Ok(true) => return Ok(boolean(true)),
                        Ok(false) => {}
                        Err(_) => failed = true,
                    }
                }
                if failed {
                    ThinError::expected()
                } else {
                    Ok(boolean(false))
                }
            }
            Expression::Exists(pattern) => {
                let solutions = self
                    .query
                    .evaluate_graph_pattern(pattern, self.solution)
                    .map_err(|_| ThinError::default())?;
                Ok(boolean(!solutions.is_empty()))
            }
            Expression::If(test, if_true, if_false) => {
                if self.effective_boolean_value(test)? {
                    self.evaluate(if_true)
                } else {
                    self.evaluate(if_false)
                }
            }
            Expression::Coalesce(args) => args
                .iter()
                .find_map(|arg| self.evaluate(arg).ok())
                .ok_or(ThinError::default()),
            Expression::FunctionCall(function, args) => self.call(function, args),
            // Arithmetic is rejected before evaluation starts.
            _ => ThinError::expected(),
        }
    }

    pub(crate) fn effective_boolean_value(&self, expression: &Expression) -> ThinResult<bool> {
        effective_boolean_value(&self.evaluate(expression)?)
    }

    fn compare(
        &self,
        lhs: &Expression,
        rhs: &Expression,
        test: fn(Ordering) -> bool,
    ) -> ThinResult<Term> {
        let ordering = compare_values(&self.evaluate(lhs)?, &self.evaluate(rhs)?)?;
        Ok(boolean(test(ordering)))
    }

    fn call(&self, function: &Function, args: &[Expression]) -> ThinResult<Term> {
        let args = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<ThinResult<Vec<_>>>()?;
        match (function, args.as_slice()) {
            (Function::Str, [term]) => match term {
                Term::NamedNode(nn) => Ok(Literal::new_simple_literal(nn.as_str()).into()),
                Term::Literal(literal) => Ok(Literal::new_simple_literal(literal.value()).into()),
                _ => ThinError::expected(),
            },
            (Function::Lang, [Term::Literal(literal)]) => {
                Ok(Literal::new_simple_literal(literal.language().unwrap_or_default()).into())
            }
            (Function::Datatype, [Term::Literal(literal)]) => {
                Ok(literal.datatype().into_owned().into())
            }
            (Function::Regex, [text, pattern, rest @ ..]) if rest.len() <= 1 => {
                let text = string_value(text)?;
                let pattern = string_value(pattern)?;
                let flags = match rest {
                    [flags] => string_value(flags)?,
                    _ => "",
                };
                let regex = self
                    .query
                    .regex(pattern, flags)
                    .ok_or(ThinError::default())?;
                Ok(boolean(regex.is_match(text)))
            }
            (Function::StrStarts, [text, prefix]) => {
                Ok(boolean(string_value(text)?.starts_with(string_value(prefix)?)))
            }
            (Function::StrEnds, [text, suffix]) => {
                Ok(boolean(string_value(text)?.ends_with(string_value(suffix)?)))
            }
            (Function::Contains, [text, needle]) => {
                Ok(boolean(string_value(text)?.contains(string_value(needle)?)))
            }
            (Function::StrLen, [text]) => Ok(integer(string_value(text)?.chars().count())),
            (Function::UCase, [Term::Literal(literal)]) => {
                map_string_literal(literal, str::to_uppercase)
            }
            (Function::LCase, [Term::Literal(literal)]) => {
                map_string_literal(literal, str::to_lowercase)
            }
            (Function::IsIri, [term]) => Ok(boolean(matches!(term, Term::NamedNode(_)))),
            (Function::IsBlank, [term]) => Ok(boolean(matches!(term, Term::BlankNode(_)))),
            (Function::IsLiteral, [term]) => Ok(boolean(matches!(term, Term::Literal(_)))),
            _ => ThinError::expected(),
        }
    }
}

fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}

fn is_string_literal(literal: &Literal) -> bool {
    literal.datatype() == xsd::STRING || literal.datatype() == rdf::LANG_STRING
}

/// The lexical form of a simple or language-tagged string literal.
fn string_value(term: &Term) -> ThinResult<&str> {
    match term {
        Term::Literal(literal) if is_string_literal(literal) => Ok(literal.value()),
        _ => ThinError::expected(),
    }
}

fn map_string_literal(literal: &Literal, map: impl Fn(&str) -> String) -> ThinResult<Term> {
    if !is_string_literal(literal) {
        return ThinError::expected();
    }
    let value = map(literal.value());
    Ok(match literal.language() {
        Some(language) => Literal::new_language_tagged_literal_unchecked(value, language),
        None => Literal::new_simple_literal(value),
    }
    .into())
}

fn numeric_value(literal: &Literal) -> Option<f64> {
    if NUMERIC_TYPES.contains(&literal.datatype()) {
        literal.value().trim().parse().ok()
    } else {
        None
    }
}

fn boolean_value(literal: &Literal) -> Option<bool> {
    if literal.datatype() != xsd::BOOLEAN {
        return None;
    }
    match literal.value() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn effective_boolean_value(term: &Term) -> ThinResult<bool> {
    let Term::Literal(literal) = term else {
        return ThinError::expected();
    };
    if is_string_literal(literal) {
        return Ok(!literal.value().is_empty());
    }
    if let Some(value) = boolean_value(literal) {
        return Ok(value);
    }
    match numeric_value(literal) {
        Some(value) => Ok(value != 0.0 && !value.is_nan()),
        None => ThinError::expected(),
    }
}

/// The `=` operator.
///
/// Distinct literals are only known to differ if both are numbers, booleans or strings. Any
/// other pair of distinct literals cannot be compared.
fn equals(lhs: &Term, rhs: &Term) -> ThinResult<bool> {
    if lhs == rhs {
        return Ok(true);
    }
    let (Term::Literal(lhs), Term::Literal(rhs)) = (lhs, rhs) else {
        return Ok(false);
    };
    if let (Some(lhs), Some(rhs)) = (numeric_value(lhs), numeric_value(rhs)) {
        return Ok(lhs == rhs);
    }
    if let (Some(lhs), Some(rhs)) = (boolean_value(lhs), boolean_value(rhs)) {
        return Ok(lhs == rhs);
    }
    if is_string_literal(lhs) && is_string_literal(rhs) {
        return Ok(false);
    }
    ThinError::expected()
}

/// The ordering used by `<`, `<=`, `>` and `>=`.
fn compare_values(lhs: &Term, rhs: &Term) -> ThinResult<Ordering> {
    let (Term::Literal(lhs), Term::Literal(rhs)) = (lhs, rhs) else {
        return ThinError::expected();
    };
    if let (Some(lhs), Some(rhs)) = (numeric_value(lhs), numeric_value(rhs)) {
        return lhs.partial_cmp(&rhs).ok_or(ThinError::default());
    }
    if let (Some(lhs), Some(rhs)) = (boolean_value(lhs), boolean_value(rhs)) {
        return Ok(lhs.cmp(&rhs));
    }
    if lhs.datatype() == xsd::STRING && rhs.datatype() == xsd::STRING {
        return Ok(lhs.value().cmp(rhs.value()));
    }
    ThinError::expected()
}

/// A total order over optional terms for `ORDER BY`, `MIN` and `MAX`.
///
/// Unbound sorts first, then blank nodes, IRIs and literals. Numeric literals sort before all
/// other literals.
pub(crate) fn order_terms(lhs: Option<&Term>, rhs: Option<&Term>) -> Ordering {
    fn rank(term: Option<&Term>) -> u8 {
        match term {
            None => 0,
            Some(Term::BlankNode(_)) => 1,
            Some(Term::NamedNode(_)) => 2,
            Some(Term::Literal(_)) => 3,
            #[allow(unreachable_patterns)]
            Some(_) => 4,
        }
    }

    match (lhs, rhs) {
        (Some(Term::BlankNode(lhs)), Some(Term::BlankNode(rhs))) => lhs.as_str().cmp(rhs.as_str()),
        (Some(Term::NamedNode(lhs)), Some(Term::NamedNode(rhs))) => lhs.as_str().cmp(rhs.as_str()),
        (Some(Term::Literal(lhs)), Some(Term::Literal(rhs))) => order_literals(lhs, rhs),
        _ => rank(lhs).cmp(&rank(rhs)),
    }
}

fn order_literals(lhs: &Literal, rhs: &Literal) -> Ordering {
    match (numeric_value(lhs), numeric_value(rhs)) {
        (Some(l), Some(r)) => l.total_cmp(&r).then_with(|| lhs.value().cmp(rhs.value())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lhs
            .value()
            .cmp(rhs.value())
            .then_with(|| lhs.datatype().as_str().cmp(rhs.datatype().as_str()))
            .then_with(|| lhs.language().cmp(&rhs.language())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(value: &str, datatype: NamedNodeRef<'_>) -> Term {
        Literal::new_typed_literal(value, datatype).into()
    }

    fn simple(value: &str) -> Term {
        Literal::new_simple_literal(value).into()
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(
            equals(&typed("1", xsd::INTEGER), &typed("1.0", xsd::DECIMAL)),
            Ok(true)
        );
        assert_eq!(
            compare_values(&typed("9", xsd::INTEGER), &typed("10", xsd::INTEGER)),
            Ok(Ordering::Less)
        );
    }

    #[test]
    fn distinct_strings_are_unequal() {
        assert_eq!(equals(&simple("IMAGE"), &simple("image")), Ok(false));
        let tagged: Term = Literal::new_language_tagged_literal_unchecked("IMAGE", "en").into();
        assert_eq!(equals(&simple("IMAGE"), &tagged), Ok(false));
    }

    #[test]
    fn unrelated_literals_cannot_be_compared() {
        assert!(equals(&simple("1"), &typed("2020-01-01", xsd::DATE)).is_err());
    }

    #[test]
    fn effective_boolean_value_of_literals() {
        assert_eq!(effective_boolean_value(&simple("")), Ok(false));
        assert_eq!(effective_boolean_value(&simple("x")), Ok(true));
        assert_eq!(effective_boolean_value(&typed("0", xsd::INTEGER)), Ok(false));
        assert_eq!(effective_boolean_value(&boolean(true)), Ok(true));
        assert!(effective_boolean_value(&typed("2020", xsd::DATE)).is_err());
    }

    #[test]
    fn order_is_total_across_kinds() {
        let iri: Term = edm_quality_model::NamedNode::new_unchecked("http://e.com/a").into();
        let mut terms = [
            Some(simple("b")),
            Some(typed("10", xsd::INTEGER)),
            None,
            Some(iri),
            Some(typed("9", xsd::INTEGER)),
        ];
        terms.sort_by(|a, b| order_terms(a.as_ref(), b.as_ref()));
        assert_eq!(terms[0], None);
        assert!(matches!(terms[1], Some(Term::NamedNode(_))));
        assert_eq!(terms[2], Some(typed("9", xsd::INTEGER)));
        assert_eq!(terms[3], Some(typed("10", xsd::INTEGER)));
        assert_eq!(terms[4], Some(simple("b")));
    }
}
