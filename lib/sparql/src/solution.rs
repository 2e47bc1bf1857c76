use edm_quality_model::{Term, Variable};
use std::collections::HashMap;

/// A single solution mapping from variables to RDF terms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    bindings: HashMap<Variable, Term>,
}

impl Solution {
    /// Returns the term bound to `variable`, if any.
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Returns the term bound to the variable called `name` (without the leading `?`).
    pub fn get_by_name(&self, name: &str) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(variable, _)| variable.as_str() == name)
            .map(|(_, term)| term)
    }

    /// Binds `variable` to `term`, replacing a previous binding.
    pub fn bind(&mut self, variable: Variable, term: Term) {
        self.bindings.insert(variable, term);
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter()
    }

    /// Two solutions are compatible if they agree on every variable bound in both.
    pub(crate) fn is_compatible(&self, other: &Self) -> bool {
        self.bindings.iter().all(|(variable, term)| {
            other
                .bindings
                .get(variable)
                .map_or(true, |other_term| other_term == term)
        })
    }

    pub(crate) fn shares_variable_with(&self, other: &Self) -> bool {
        self.bindings
            .keys()
            .any(|variable| other.bindings.contains_key(variable))
    }

    /// Merges two compatible solutions.
    pub(crate) fn merge(&self, other: &Self) -> Self {
        let mut bindings = self.bindings.clone();
        for (variable, term) in &other.bindings {
            bindings
                .entry(variable.clone())
                .or_insert_with(|| term.clone());
        }
        Self { bindings }
    }

    pub(crate) fn project(&self, variables: &[Variable]) -> Self {
        let bindings = variables
            .iter()
            .filter_map(|variable| {
                self.bindings
                    .get(variable)
                    .map(|term| (variable.clone(), term.clone()))
            })
            .collect();
        Self { bindings }
    }
}

/// The result of evaluating a `SELECT` query.
#[derive(Clone, Debug, Default)]
pub struct QuerySolutions {
    variables: Vec<Variable>,
    solutions: Vec<Solution>,
}

impl QuerySolutions {
    pub(crate) fn new(variables: Vec<Variable>, solutions: Vec<Solution>) -> Self {
        Self {
            variables,
            solutions,
        }
    }

    /// The projected variables, in the order of the `SELECT` clause.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    /// Returns the bindings of the solution at `index` in projection order.
    pub fn row(&self, index: usize) -> Option<Vec<Option<&Term>>> {
        let solution = self.solutions.get(index)?;
        Some(
            self.variables
                .iter()
                .map(|variable| solution.get(variable))
                .collect(),
        )
    }
}

impl IntoIterator for QuerySolutions {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}
