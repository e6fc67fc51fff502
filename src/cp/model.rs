//! Boolean constraint model.
//!
//! Variables are 0/1. Constraints are clauses (disjunctions of literals)
//! and linear bounds `lo <= Σ coef·x <= hi` with signed integer
//! coefficients. The objective is a weighted sum to maximize.

use std::fmt;

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position in the model's variable list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// The literal "this variable is true".
    #[inline]
    pub fn is_true(self) -> Lit {
        Lit {
            var: self,
            positive: true,
        }
    }

    /// The literal "this variable is false".
    #[inline]
    pub fn is_false(self) -> Lit {
        Lit {
            var: self,
            positive: false,
        }
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    /// Underlying variable.
    pub var: VarId,
    /// `true` for `x`, `false` for `¬x`.
    pub positive: bool,
}

impl Lit {
    /// The opposite literal.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            var: self.var,
            positive: !self.positive,
        }
    }

    /// Whether the literal holds under `value` for its variable.
    #[inline]
    pub fn holds(self, value: bool) -> bool {
        value == self.positive
    }
}

/// A model constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// At least one literal holds.
    Clause(Vec<Lit>),
    /// `lo <= Σ coef·x <= hi`.
    Linear {
        terms: Vec<(VarId, i64)>,
        lo: i64,
        hi: i64,
    },
}

impl Constraint {
    /// Whether a full assignment satisfies the constraint.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        match self {
            Constraint::Clause(lits) => lits.iter().any(|l| l.holds(values[l.var.0])),
            Constraint::Linear { terms, lo, hi } => {
                let sum: i64 = terms
                    .iter()
                    .filter(|(var, _)| values[var.0])
                    .map(|(_, coef)| coef)
                    .sum();
                *lo <= sum && sum <= *hi
            }
        }
    }
}

/// A boolean model: variables, constraints, maximization objective.
///
/// Each solve gets its own model; nothing is shared between solves.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    name: String,
    var_names: Vec<String>,
    fixed: Vec<Option<bool>>,
    constraints: Vec<Constraint>,
    weights: Vec<i64>,
    contradictory: bool,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable.
    pub fn new_var(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.var_names.len());
        self.var_names.push(name.into());
        self.fixed.push(None);
        self.weights.push(0);
        id
    }

    /// Fixes a variable. Fixing it both ways makes the model infeasible.
    pub fn fix(&mut self, var: VarId, value: bool) {
        match self.fixed[var.0] {
            Some(current) if current != value => self.contradictory = true,
            _ => self.fixed[var.0] = Some(value),
        }
    }

    /// Adds `lits[0] ∨ lits[1] ∨ ...`. An empty clause is unsatisfiable.
    pub fn add_clause(&mut self, lits: Vec<Lit>) {
        self.constraints.push(Constraint::Clause(lits));
    }

    /// Adds `lo <= Σ coef·x <= hi`. Zero coefficients are dropped and
    /// repeated variables merged.
    pub fn add_linear(&mut self, terms: &[(VarId, i64)], lo: i64, hi: i64) {
        let mut merged: Vec<(VarId, i64)> = Vec::with_capacity(terms.len());
        for &(var, coef) in terms {
            match merged.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coef,
                None => merged.push((var, coef)),
            }
        }
        merged.retain(|(_, coef)| *coef != 0);
        self.constraints.push(Constraint::Linear {
            terms: merged,
            lo,
            hi,
        });
    }

    /// `Σ coef·x <= hi`.
    pub fn add_linear_le(&mut self, terms: &[(VarId, i64)], hi: i64) {
        self.add_linear(terms, i64::MIN, hi);
    }

    /// `Σ coef·x >= lo`.
    pub fn add_linear_ge(&mut self, terms: &[(VarId, i64)], lo: i64) {
        self.add_linear(terms, lo, i64::MAX);
    }

    /// At most `k` of `vars` are true.
    pub fn add_at_most(&mut self, vars: &[VarId], k: i64) {
        let terms: Vec<(VarId, i64)> = vars.iter().map(|&v| (v, 1)).collect();
        self.add_linear_le(&terms, k);
    }

    /// At most one of `vars` is true.
    pub fn add_at_most_one(&mut self, vars: &[VarId]) {
        if vars.len() > 1 {
            self.add_at_most(vars, 1);
        }
    }

    /// Adds `weight` to the objective coefficient of `var`.
    pub fn add_objective_term(&mut self, var: VarId, weight: i64) {
        self.weights[var.0] += weight;
    }

    /// Objective coefficient of `var`.
    pub fn weight(&self, var: VarId) -> i64 {
        self.weights[var.0]
    }

    /// All objective coefficients, by variable index.
    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    /// Fixed value of `var`, if any.
    pub fn fixed(&self, var: VarId) -> Option<bool> {
        self.fixed[var.0]
    }

    /// Whether conflicting fixings were recorded.
    pub fn is_contradictory(&self) -> bool {
        self.contradictory
    }

    /// Variable name.
    pub fn var_name(&self, var: VarId) -> &str {
        &self.var_names[var.0]
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// All constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective value of a full assignment.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.weights
            .iter()
            .zip(values)
            .filter(|(_, &v)| v)
            .map(|(w, _)| w)
            .sum()
    }

    /// Whether a full assignment satisfies every fixing and constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        !self.contradictory
            && values.len() == self.var_count()
            && self
                .fixed
                .iter()
                .zip(values)
                .all(|(f, v)| f.map_or(true, |f| f == *v))
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_model() {
        let mut model = CpModel::new("test");
        let a = model.new_var("a");
        let b = model.new_var("b");
        model.add_clause(vec![a.is_true(), b.is_true()]);
        model.add_at_most_one(&[a, b]);
        model.add_objective_term(a, 3);
        assert_eq!(model.var_count(), 2);
        assert_eq!(model.constraint_count(), 2);
        assert_eq!(model.var_name(b), "b");
        assert_eq!(model.weight(a), 3);
    }

    #[test]
    fn test_linear_merges_terms() {
        let mut model = CpModel::new("test");
        let a = model.new_var("a");
        let b = model.new_var("b");
        model.add_linear(&[(a, 1), (b, 2), (a, -1)], 0, 2);
        match &model.constraints()[0] {
            Constraint::Linear { terms, .. } => assert_eq!(terms, &vec![(b, 2)]),
            other => panic!("unexpected constraint {other:?}"),
        }
    }

    #[test]
    fn test_feasibility_check() {
        let mut model = CpModel::new("test");
        let a = model.new_var("a");
        let b = model.new_var("b");
        model.add_clause(vec![a.is_false(), b.is_false()]);
        model.fix(a, true);
        assert!(model.is_feasible(&[true, false]));
        assert!(!model.is_feasible(&[true, true]));
        assert!(!model.is_feasible(&[false, false]));
    }

    #[test]
    fn test_conflicting_fix() {
        let mut model = CpModel::new("test");
        let a = model.new_var("a");
        model.fix(a, true);
        model.fix(a, true);
        assert!(!model.is_contradictory());
        model.fix(a, false);
        assert!(model.is_contradictory());
    }

    #[test]
    fn test_evaluate() {
        let mut model = CpModel::new("test");
        let a = model.new_var("a");
        let b = model.new_var("b");
        model.add_objective_term(a, 5);
        model.add_objective_term(b, 7);
        model.add_objective_term(b, 1);
        assert_eq!(model.evaluate(&[true, true]), 13);
        assert_eq!(model.evaluate(&[false, true]), 8);
    }
}
