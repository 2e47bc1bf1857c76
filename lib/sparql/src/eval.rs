use crate::expression::{order_terms, ExpressionEvaluator};
use crate::solution::{QuerySolutions, Solution};
use crate::support::check_graph_pattern;
use crate::QueryEvaluationError;
use edm_quality_model::vocab::xsd;
use edm_quality_model::{Graph, Literal, SubjectRef, Term, TripleRef, Variable};
use regex::Regex;
use spargebra::algebra::{AggregateExpression, AggregateFunction, GraphPattern, OrderExpression};
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use spargebra::Query;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

type EvalResult<T> = Result<T, QueryEvaluationError>;

/// Evaluates SPARQL `SELECT` queries against a borrowed [Graph].
pub struct QueryEvaluator<'graph> {
    graph: &'graph Graph,
    /// Compiled `REGEX` patterns, keyed by pattern and flags.
    regex_cache: RefCell<HashMap<(String, String), Option<Regex>>>,
}

impl<'graph> QueryEvaluator<'graph> {
    pub fn new(graph: &'graph Graph) -> Self {
        Self {
            graph,
            regex_cache: RefCell::default(),
        }
    }

    /// Parses and evaluates a query.
    pub fn evaluate_str(&self, query: &str) -> EvalResult<QuerySolutions> {
        let query = Query::parse(query, None)?;
        self.evaluate(&query)
    }

    /// Evaluates a parsed query.
    pub fn evaluate(&self, query: &Query) -> EvalResult<QuerySolutions> {
        match query {
            Query::Select { pattern, .. } => {
                check_graph_pattern(pattern)?;
                let solutions = self.evaluate_graph_pattern(pattern, &Solution::default())?;
                let variables = projected_variables(pattern)
                    .unwrap_or_else(|| collect_variables(&solutions));
                Ok(QuerySolutions::new(variables, solutions))
            }
            Query::Construct { .. } => Err(QueryEvaluationError::UnsupportedQueryForm("CONSTRUCT")),
            Query::Describe { .. } => Err(QueryEvaluationError::UnsupportedQueryForm("DESCRIBE")),
            Query::Ask { .. } => Err(QueryEvaluationError::UnsupportedQueryForm("ASK")),
        }
    }

    /// Evaluates `pattern` with the variables of `seed` already bound.
    ///
    /// The seed is how `EXISTS` sees the bindings of the solution it is filtering.
    pub(crate) fn evaluate_graph_pattern(
        &self,
        pattern: &GraphPattern,
        seed: &Solution,
    ) -> EvalResult<Vec<Solution>> {
        match pattern {
            GraphPattern::Bgp { patterns } => Ok(self.evaluate_bgp(patterns, seed)),
            GraphPattern::Project { inner, variables } => Ok(self
                .evaluate_graph_pattern(inner, seed)?
                .iter()
                .map(|solution| solution.project(variables))
                .collect()),
            GraphPattern::Filter { inner, expr } => {
                let solutions = self.evaluate_graph_pattern(inner, seed)?;
                Ok(solutions
                    .into_iter()
                    .filter(|solution| {
                        ExpressionEvaluator::new(self, solution)
                            .effective_boolean_value(expr)
                            .unwrap_or(false)
                    })
                    .collect())
            }
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let mut solutions = self.evaluate_graph_pattern(inner, seed)?;
                for solution in &mut solutions {
                    if solution.get(variable).is_some() {
                        continue;
                    }
                    let value = ExpressionEvaluator::new(self, solution).evaluate(expression);
                    if let Ok(term) = value {
                        solution.bind(variable.clone(), term);
                    }
                }
                Ok(solutions)
            }
            GraphPattern::Join { left, right } => {
                let left = self.evaluate_graph_pattern(left, seed)?;
                let right = self.evaluate_graph_pattern(right, seed)?;
                let mut result = Vec::new();
                for l in &left {
                    for r in &right {
                        if l.is_compatible(r) {
                            result.push(l.merge(r));
                        }
                    }
                }
                Ok(result)
            }
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => {
                let left = self.evaluate_graph_pattern(left, seed)?;
                let right = self.evaluate_graph_pattern(right, seed)?;
                let mut result = Vec::new();
                for l in left {
                    let mut matched = false;
                    for r in &right {
                        if !l.is_compatible(r) {
                            continue;
                        }
                        let merged = l.merge(r);
                        let keep = expression.as_ref().map_or(true, |expression| {
                            ExpressionEvaluator::new(self, &merged)
                                .effective_boolean_value(expression)
                                .unwrap_or(false)
                        });
                        if keep {
                            result.push(merged);
                            matched = true;
                        }
                    }
                    if !matched {
                        result.push(l);
                    }
                }
                Ok(result)
            }
            GraphPattern::Union { left, right } => {
                let mut result = self.evaluate_graph_pattern(left, seed)?;
                result.extend(self.evaluate_graph_pattern(right, seed)?);
                Ok(result)
            }
            GraphPattern::Minus { left, right } => {
                let left = self.evaluate_graph_pattern(left, seed)?;
                let right = self.evaluate_graph_pattern(right, seed)?;
                Ok(left
                    .into_iter()
                    .filter(|l| {
                        !right
                            .iter()
                            .any(|r| l.shares_variable_with(r) && l.is_compatible(r))
                    })
                    .collect())
            }
            GraphPattern::Distinct { inner } | GraphPattern::Reduced { inner } => {
                let mut result: Vec<Solution> = Vec::new();
                for solution in self.evaluate_graph_pattern(inner, seed)? {
                    if !result.contains(&solution) {
                        result.push(solution);
                    }
                }
                Ok(result)
            }
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                let solutions = self.evaluate_graph_pattern(inner, seed)?.into_iter();
                Ok(match length {
                    Some(length) => solutions.skip(*start).take(*length).collect(),
                    None => solutions.skip(*start).collect(),
                })
            }
            GraphPattern::OrderBy { inner, expression } => {
                let solutions = self.evaluate_graph_pattern(inner, seed)?;
                Ok(self.order_by(solutions, expression))
            }
            GraphPattern::Group {
                inner,
                variables,
                aggregates,
            } => {
                let solutions = self.evaluate_graph_pattern(inner, seed)?;
                Ok(self.group(solutions, variables, aggregates))
            }
            _ => QueryEvaluationError::not_implemented(format!("graph pattern {pattern}")),
        }
    }

    /// Evaluates a basic graph pattern, one triple pattern at a time.
    fn evaluate_bgp(&self, patterns: &[TriplePattern], seed: &Solution) -> Vec<Solution> {
        let mut solutions = vec![seed.clone()];
        for pattern in patterns {
            let mut next = Vec::new();
            for solution in &solutions {
                self.match_triple_pattern(pattern, solution, &mut next);
            }
            solutions = next;
            if solutions.is_empty() {
                break;
            }
        }
        solutions
    }

    fn match_triple_pattern(
        &self,
        pattern: &TriplePattern,
        solution: &Solution,
        output: &mut Vec<Solution>,
    ) {
        let Some(subject) = PatternSlot::from_term_pattern(&pattern.subject, solution) else {
            return;
        };
        let predicate = PatternSlot::from_named_node_pattern(&pattern.predicate, solution);
        let Some(object) = PatternSlot::from_term_pattern(&pattern.object, solution) else {
            return;
        };

        let candidates: Box<dyn Iterator<Item = TripleRef<'_>> + '_> =
            match (&subject, &predicate, &object) {
                (PatternSlot::Bound(s), _, _) => match subject_ref(s) {
                    Some(s) => Box::new(self.graph.triples_for_subject(s)),
                    None => return,
                },
                (_, _, PatternSlot::Bound(o)) => Box::new(self.graph.triples_for_object(o)),
                (_, PatternSlot::Bound(Term::NamedNode(p)), _) => {
                    Box::new(self.graph.triples_for_predicate(p))
                }
                (_, PatternSlot::Bound(_), _) => return,
                _ => Box::new(self.graph.iter()),
            };

        for triple in candidates {
            let mut candidate = solution.clone();
            if subject.unify(&mut candidate, Term::from(triple.subject.into_owned()))
                && predicate.unify(&mut candidate, Term::from(triple.predicate.into_owned()))
                && object.unify(&mut candidate, triple.object.into_owned())
            {
                output.push(candidate);
            }
        }
    }

    fn order_by(
        &self,
        mut solutions: Vec<Solution>,
        expressions: &[OrderExpression],
    ) -> Vec<Solution> {
        solutions.sort_by(|a, b| {
            for expression in expressions {
                let (inner, ascending) = match expression {
                    OrderExpression::Asc(inner) => (inner, true),
                    OrderExpression::Desc(inner) => (inner, false),
                };
                let a = ExpressionEvaluator::new(self, a).evaluate(inner).ok();
                let b = ExpressionEvaluator::new(self, b).evaluate(inner).ok();
                let ordering = order_terms(a.as_ref(), b.as_ref());
                let ordering = if ascending { ordering } else { ordering.reverse() };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        solutions
    }

    /// Groups the solutions by `variables` and computes one aggregate row per group.
    ///
    /// Without grouping variables there is always exactly one group, even for zero solutions.
    fn group(
        &self,
        solutions: Vec<Solution>,
        variables: &[Variable],
        aggregates: &[(Variable, AggregateExpression)],
    ) -> Vec<Solution> {
        let mut keys: Vec<Vec<Option<Term>>> = Vec::new();
        let mut members: HashMap<Vec<Option<Term>>, Vec<Solution>> = HashMap::new();
        for solution in solutions {
            let key: Vec<_> = variables
                .iter()
                .map(|variable| solution.get(variable).cloned())
                .collect();
            members
                .entry(key.clone())
                .or_insert_with(|| {
                    keys.push(key);
                    Vec::new()
                })
                .push(solution);
        }
        if keys.is_empty() && variables.is_empty() {
            keys.push(Vec::new());
        }

        keys.into_iter()
            .map(|key| {
                let group = members.remove(&key).unwrap_or_default();
                let mut row = Solution::default();
                for (variable, value) in variables.iter().zip(key) {
                    if let Some(value) = value {
                        row.bind(variable.clone(), value);
                    }
                }
                for (variable, aggregate) in aggregates {
                    if let Some(value) = self.aggregate(aggregate, &group) {
                        row.bind(variable.clone(), value);
                    }
                }
                row
            })
            .collect()
    }

    fn aggregate(&self, aggregate: &AggregateExpression, group: &[Solution]) -> Option<Term> {
        match aggregate {
            AggregateExpression::CountSolutions { distinct } => {
                let count = if *distinct {
                    let mut seen: Vec<&Solution> = Vec::new();
                    for solution in group {
                        if !seen.contains(&solution) {
                            seen.push(solution);
                        }
                    }
                    seen.len()
                } else {
                    group.len()
                };
                Some(integer(count))
            }
            AggregateExpression::FunctionCall {
                name,
                expr,
                distinct,
            } => {
                let mut values = Vec::new();
                for solution in group {
                    if let Ok(value) = ExpressionEvaluator::new(self, solution).evaluate(expr) {
                        if !*distinct || !values.contains(&value) {
                            values.push(value);
                        }
                    }
                }
                match name {
                    AggregateFunction::Count => Some(integer(values.len())),
                    AggregateFunction::Sample => values.into_iter().next(),
                    AggregateFunction::Min => values
                        .into_iter()
                        .min_by(|a, b| order_terms(Some(a), Some(b))),
                    AggregateFunction::Max => values
                        .into_iter()
                        .max_by(|a, b| order_terms(Some(a), Some(b))),
                    AggregateFunction::GroupConcat { separator } => {
                        let parts = values
                            .iter()
                            .map(|value| match value {
                                Term::Literal(literal) => Some(literal.value()),
                                _ => None,
                            })
                            .collect::<Option<Vec<_>>>()?;
                        Some(
                            Literal::new_simple_literal(
                                parts.join(separator.as_deref().unwrap_or(" ")),
                            )
                            .into(),
                        )
                    }
                    // Excluded by the support check.
                    AggregateFunction::Sum
                    | AggregateFunction::Avg
                    | AggregateFunction::Custom(_) => None,
                }
            }
        }
    }

    /// Compiles a `REGEX` pattern once per query evaluator.
    pub(crate) fn regex(&self, pattern: &str, flags: &str) -> Option<Regex> {
        let key = (pattern.to_owned(), flags.to_owned());
        self.regex_cache
            .borrow_mut()
            .entry(key)
            .or_insert_with(|| compile_regex(pattern, flags))
            .clone()
    }
}

/// Either a term the triple must match or a variable that is still unbound.
enum PatternSlot {
    Bound(Term),
    Free(Variable),
}

impl PatternSlot {
    fn from_term_pattern(pattern: &TermPattern, solution: &Solution) -> Option<Self> {
        let slot = match pattern {
            TermPattern::NamedNode(nn) => Self::Bound(nn.clone().into()),
            TermPattern::Literal(literal) => Self::Bound(literal.clone().into()),
            // Blank nodes in a query act as variables that cannot be projected.
            TermPattern::BlankNode(bnode) => {
                let variable = Variable::new_unchecked(format!("_bnode_{}", bnode.as_str()));
                Self::from_variable(variable, solution)
            }
            TermPattern::Variable(variable) => Self::from_variable(variable.clone(), solution),
            #[allow(unreachable_patterns)]
            _ => return None,
        };
        Some(slot)
    }

    fn from_named_node_pattern(pattern: &NamedNodePattern, solution: &Solution) -> Self {
        match pattern {
            NamedNodePattern::NamedNode(nn) => Self::Bound(nn.clone().into()),
            NamedNodePattern::Variable(variable) => Self::from_variable(variable.clone(), solution),
        }
    }

    fn from_variable(variable: Variable, solution: &Solution) -> Self {
        match solution.get(&variable) {
            Some(term) => Self::Bound(term.clone()),
            None => Self::Free(variable),
        }
    }

    /// Checks `value` against the slot, binding it if the slot is a free variable.
    ///
    /// A variable that occurs twice in one triple pattern is bound by the first position and
    /// checked by the second.
    fn unify(&self, solution: &mut Solution, value: Term) -> bool {
        match self {
            Self::Bound(term) => *term == value,
            Self::Free(variable) => match solution.get(variable) {
                Some(existing) => *existing == value,
                None => {
                    solution.bind(variable.clone(), value);
                    true
                }
            },
        }
    }
}

fn subject_ref(term: &Term) -> Option<SubjectRef<'_>> {
    match term {
        Term::NamedNode(nn) => Some(nn.as_ref().into()),
        Term::BlankNode(bnode) => Some(bnode.as_ref().into()),
        _ => None,
    }
}

fn compile_regex(pattern: &str, flags: &str) -> Option<Regex> {
    let mut builder = regex::RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            's' => builder.dot_matches_new_line(true),
            'm' => builder.multi_line(true),
            'x' => builder.ignore_whitespace(true),
            _ => return None,
        };
    }
    builder.build().ok()
}

pub(crate) fn integer(value: usize) -> Term {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER).into()
}

fn projected_variables(pattern: &GraphPattern) -> Option<Vec<Variable>> {
    match pattern {
        GraphPattern::Project { variables, .. } => Some(variables.clone()),
        GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::OrderBy { inner, .. } => projected_variables(inner),
        _ => None,
    }
}

fn collect_variables(solutions: &[Solution]) -> Vec<Variable> {
    let mut variables: Vec<Variable> = Vec::new();
    for solution in solutions {
        for (variable, _) in solution.iter() {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
        }
    }
    variables.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_quality_model::{LiteralRef, NamedNodeRef};

    const EX: &str = "http://example.com/";

    fn node(name: &str) -> NamedNodeRef<'static> {
        NamedNodeRef::new_unchecked(Box::leak(format!("{EX}{name}").into_boxed_str()))
    }

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        for (subject, language) in [("a", "en"), ("b", "en"), ("c", "ENG")] {
            let language = LiteralRef::new_simple_literal(language);
            graph.insert(TripleRef::new(node(subject), node("lang"), language));
        }
        graph.insert(TripleRef::new(node("a"), node("next"), node("b")));
        graph
    }

    fn count(graph: &Graph, query: &str) -> String {
        let solutions = QueryEvaluator::new(graph).evaluate_str(query).unwrap();
        let value = match solutions.iter().next().and_then(|s| s.get_by_name("count")) {
            Some(Term::Literal(literal)) => literal.value().to_owned(),
            other => panic!("unexpected count binding {other:?}"),
        };
        value
    }

    #[test]
    fn count_star_over_empty_graph_is_zero() {
        let graph = Graph::new();
        assert_eq!(count(&graph, "SELECT (COUNT(*) AS ?count) WHERE { ?s ?p ?o }"), "0");
    }

    #[test]
    fn regex_filter_counts_invalid_codes() {
        let query = format!(
            "SELECT (COUNT(*) AS ?count) WHERE {{ ?s <{EX}lang> ?l FILTER(!REGEX(?l, \"^[a-z]{{2}}$\")) }}"
        );
        assert_eq!(count(&sample_graph(), &query), "1");
    }

    #[test]
    fn not_exists_sees_outer_bindings() {
        let query = format!(
            "SELECT (COUNT(*) AS ?count) WHERE {{ ?s <{EX}lang> ?l FILTER NOT EXISTS {{ ?s <{EX}next> ?o }} }}"
        );
        assert_eq!(count(&sample_graph(), &query), "2");
    }

    #[test]
    fn group_by_counts_each_value() {
        let query = format!(
            "SELECT ?l (COUNT(*) AS ?count) WHERE {{ ?s <{EX}lang> ?l }} GROUP BY ?l ORDER BY ?l"
        );
        let solutions = QueryEvaluator::new(&sample_graph()).evaluate_str(&query).unwrap();
        assert_eq!(solutions.len(), 2);
        assert_eq!(solutions.variables().len(), 2);
        let rows: Vec<(String, String)> = solutions
            .iter()
            .map(|s| match (s.get_by_name("l"), s.get_by_name("count")) {
                (Some(Term::Literal(l)), Some(Term::Literal(c))) => {
                    (l.value().to_owned(), c.value().to_owned())
                }
                other => panic!("unexpected row {other:?}"),
            })
            .collect();
        assert_eq!(
            rows,
            vec![("ENG".to_owned(), "1".to_owned()), ("en".to_owned(), "2".to_owned())]
        );
    }

    #[test]
    fn not_in_filters_enumerated_values() {
        let query = format!(
            "SELECT (COUNT(*) AS ?count) WHERE {{ ?s <{EX}lang> ?l FILTER(?l NOT IN (\"en\", \"fr\")) }}"
        );
        assert_eq!(count(&sample_graph(), &query), "1");
    }

    #[test]
    fn optional_keeps_unmatched_solutions() {
        let query = format!(
            "SELECT ?s ?o WHERE {{ ?s <{EX}lang> ?l OPTIONAL {{ ?s <{EX}next> ?o }} }}"
        );
        let solutions = QueryEvaluator::new(&sample_graph()).evaluate_str(&query).unwrap();
        assert_eq!(solutions.len(), 3);
        assert_eq!(solutions.iter().filter(|s| s.get_by_name("o").is_some()).count(), 1);
    }

    #[test]
    fn ask_queries_are_rejected() {
        let result = QueryEvaluator::new(&Graph::new()).evaluate_str("ASK { ?s ?p ?o }");
        assert!(matches!(result, Err(QueryEvaluationError::UnsupportedQueryForm("ASK"))));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let result = QueryEvaluator::new(&Graph::new()).evaluate_str("SELECT WHERE {");
        assert!(matches!(result, Err(QueryEvaluationError::Parsing(_))));
    }
}
