//! Rejects algebra the evaluator cannot handle before any solution is computed.
//!
//! Running this check up front lets the evaluation itself treat every remaining failure as a
//! regular SPARQL expression error.

use crate::QueryEvaluationError;
use spargebra::algebra::{
    AggregateExpression, AggregateFunction, Expression, Function, GraphPattern, OrderExpression,
};
use spargebra::term::TermPattern;

pub(crate) fn check_graph_pattern(pattern: &GraphPattern) -> Result<(), QueryEvaluationError> {
    match pattern {
        GraphPattern::Bgp { patterns } => {
            for pattern in patterns {
                check_term_pattern(&pattern.subject)?;
                check_term_pattern(&pattern.object)?;
            }
            Ok(())
        }
        GraphPattern::Join { left, right }
        | GraphPattern::Union { left, right }
        | GraphPattern::Minus { left, right } => {
            check_graph_pattern(left)?;
            check_graph_pattern(right)
        }
        GraphPattern::LeftJoin {
            left,
            right,
            expression,
        } => {
            check_graph_pattern(left)?;
            check_graph_pattern(right)?;
            expression.as_ref().map_or(Ok(()), check_expression)
        }
        GraphPattern::Filter { expr, inner } => {
            check_expression(expr)?;
            check_graph_pattern(inner)
        }
        GraphPattern::Extend {
            inner, expression, ..
        } => {
            check_expression(expression)?;
            check_graph_pattern(inner)
        }
        GraphPattern::OrderBy { inner, expression } => {
            for expression in expression {
                match expression {
                    OrderExpression::Asc(e) | OrderExpression::Desc(e) => check_expression(e)?,
                }
            }
            check_graph_pattern(inner)
        }
        GraphPattern::Project { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. } => check_graph_pattern(inner),
        GraphPattern::Group {
            inner, aggregates, ..
        } => {
            for (_, aggregate) in aggregates {
                check_aggregate(aggregate)?;
            }
            check_graph_pattern(inner)
        }
        _ => QueryEvaluationError::not_implemented(format!("graph pattern {pattern}")),
    }
}

fn check_term_pattern(pattern: &TermPattern) -> Result<(), QueryEvaluationError> {
    match pattern {
        TermPattern::NamedNode(_)
        | TermPattern::BlankNode(_)
        | TermPattern::Literal(_)
        | TermPattern::Variable(_) => Ok(()),
        #[allow(unreachable_patterns)]
        _ => QueryEvaluationError::not_implemented("quoted triple patterns"),
    }
}

fn check_aggregate(aggregate: &AggregateExpression) -> Result<(), QueryEvaluationError> {
    match aggregate {
        AggregateExpression::CountSolutions { .. } => Ok(()),
        AggregateExpression::FunctionCall { name, expr, .. } => match name {
            AggregateFunction::Count
            | AggregateFunction::Sample
            | AggregateFunction::Min
            | AggregateFunction::Max
            | AggregateFunction::GroupConcat { .. } => check_expression(expr),
            AggregateFunction::Sum | AggregateFunction::Avg => {
                QueryEvaluationError::not_implemented("numeric aggregates")
            }
            AggregateFunction::Custom(name) => {
                QueryEvaluationError::not_implemented(format!("custom aggregate {name}"))
            }
        },
    }
}

fn check_expression(expression: &Expression) -> Result<(), QueryEvaluationError> {
    match expression {
        Expression::NamedNode(_)
        | Expression::Literal(_)
        | Expression::Variable(_)
        | Expression::Bound(_) => Ok(()),
        Expression::Not(inner) => check_expression(inner),
        Expression::Or(lhs, rhs)
        | Expression::And(lhs, rhs)
        | Expression::Equal(lhs, rhs)
        | Expression::SameTerm(lhs, rhs)
        | Expression::Greater(lhs, rhs)
        | Expression::GreaterOrEqual(lhs, rhs)
        | Expression::Less(lhs, rhs)
        | Expression::LessOrEqual(lhs, rhs) => {
            check_expression(lhs)?;
            check_expression(rhs)
        }
        Expression::In(lhs, rhs) => {
            check_expression(lhs)?;
            rhs.iter().try_for_each(check_expression)
        }
        Expression::Exists(pattern) => check_graph_pattern(pattern),
        Expression::If(test, if_true, if_false) => {
            check_expression(test)?;
            check_expression(if_true)?;
            check_expression(if_false)
        }
        Expression::Coalesce(args) => args.iter().try_for_each(check_expression),
        Expression::FunctionCall(function, args) => {
            if !is_supported_function(function) {
                return QueryEvaluationError::not_implemented(format!("function {function}"));
            }
            args.iter().try_for_each(check_expression)
        }
        Expression::Add(..)
        | Expression::Subtract(..)
        | Expression::Multiply(..)
        | Expression::Divide(..)
        | Expression::UnaryPlus(_)
        | Expression::UnaryMinus(_) => QueryEvaluationError::not_implemented("arithmetic"),
    }
}

fn is_supported_function(function: &Function) -> bool {
    matches!(
        function,
        Function::Str
            | Function::Lang
            | Function::Datatype
            | Function::Regex
            | Function::StrStarts
            | Function::StrEnds
            | Function::Contains
            | Function::StrLen
            | Function::UCase
            | Function::LCase
            | Function::IsIri
            | Function::IsBlank
            | Function::IsLiteral
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use spargebra::Query;

    fn pattern_of(query: &str) -> GraphPattern {
        match Query::parse(query, None) {
            Ok(Query::Select { pattern, .. }) => pattern,
            _ => panic!("not a valid SELECT query: {query}"),
        }
    }

    #[test]
    fn accepts_filters_with_regex_and_not_exists() {
        let pattern = pattern_of(
            "SELECT (COUNT(*) AS ?c) WHERE { ?s ?p ?o FILTER(!REGEX(?o, \"^a\") && NOT EXISTS { ?s ?q ?o }) }",
        );
        assert!(check_graph_pattern(&pattern).is_ok());
    }

    #[test]
    fn rejects_arithmetic() {
        let pattern = pattern_of("SELECT ?x WHERE { ?s ?p ?o BIND(?o + 1 AS ?x) }");
        assert!(matches!(
            check_graph_pattern(&pattern),
            Err(QueryEvaluationError::NotImplemented(_))
        ));
    }

    #[test]
    fn rejects_property_paths() {
        let pattern = pattern_of("SELECT ?o WHERE { ?s <http://e.com/p>+ ?o }");
        assert!(check_graph_pattern(&pattern).is_err());
    }
}
