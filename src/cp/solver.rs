//! Solving a [`CpModel`] with the Pumpkin lazy-clause-generation solver.
//!
//! # Algorithm
//!
//! The model is compiled into a fresh `pumpkin_solver::Solver` for every
//! call:
//! - each 0/1 variable becomes an integer variable over `[0, 1]`, or
//!   `[v, v]` when fixed;
//! - a clause `l1 ∨ … ∨ lk` becomes `Σ pos − Σ neg ≥ 1 − |neg|`;
//! - a linear row posts its finite sides as `≥` / `≤` constraints;
//! - the objective is tied to one integer variable by an equality row.
//!
//! [`CpSolver::solve`] maximizes that variable with linear SAT-UNSAT search.
//! [`CpSolver::enumerate`] calls `satisfy` repeatedly, posting a blocking
//! row after each solution so the next call must differ on at least one
//! model variable.
//!
//! Both share one `TimeBudget` started at the beginning of the call.
//!
//! # Determinism
//! Pumpkin's default solver seeds its own generator, so the same model
//! yields the same answers as long as no time limit cuts the search short.
//!
//! # Reference
//! - Stuckey (2010), "Lazy Clause Generation: Combining the Power of SAT
//!   and CP (and MIP?) Solving"
//! - Eén & Sörensson (2006), "Translating Pseudo-Boolean Constraints into SAT"

use std::fmt;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use pumpkin_solver::constraints;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{
    OptimisationResult, ProblemSolution, SatisfactionResult, SolutionReference,
};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::{DomainId, TransformableVariable};
use pumpkin_solver::Solver;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::model::{Constraint, CpModel, VarId};

/// Solver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock budget.
    pub time_limit: Duration,
    /// Stop enumerating after this many solutions.
    pub solution_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            solution_limit: None,
        }
    }
}

impl SolverConfig {
    /// Sets the time budget.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Sets the solution limit.
    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = Some(limit);
        self
    }
}

/// A complete assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpSolution {
    /// Value per variable index.
    pub values: Vec<bool>,
    /// Objective value.
    pub objective: i64,
}

impl CpSolution {
    /// Creates a solution.
    pub fn new(values: Vec<bool>, objective: i64) -> Self {
        Self { values, objective }
    }

    /// Value of `var`.
    #[inline]
    pub fn value(&self, var: VarId) -> bool {
        self.values[var.index()]
    }
}

/// Receives solutions streamed by [`CpSolver::enumerate`].
///
/// Each solution arrives whole; returning `false` stops the search.
pub trait SolutionSink {
    /// Accepts one solution.
    fn accept(&mut self, solution: CpSolution) -> bool;
}

impl SolutionSink for Vec<CpSolution> {
    fn accept(&mut self, solution: CpSolution) -> bool {
        self.push(solution);
        true
    }
}

impl SolutionSink for Sender<CpSolution> {
    fn accept(&mut self, solution: CpSolution) -> bool {
        self.send(solution).is_ok()
    }
}

/// A sink that drops every solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl SolutionSink for Discard {
    fn accept(&mut self, _solution: CpSolution) -> bool {
        true
    }
}

/// Final status of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpResult {
    /// No assignment satisfies the model.
    Infeasible,
    /// The best assignment, proven optimal.
    Optimal(CpSolution),
    /// The best assignment found before the search stopped.
    Feasible(CpSolution),
    /// Stopped before finding anything.
    Unknown,
}

impl fmt::Display for CpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpResult::Infeasible => write!(f, "Infeasible"),
            CpResult::Optimal(s) => write!(f, "Optimal(objective={})", s.objective),
            CpResult::Feasible(s) => write!(f, "Feasible(objective={})", s.objective),
            CpResult::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Why the search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The search space was exhausted with a solution.
    OptimalityProven,
    /// The search space was exhausted without one.
    InfeasibilityProven,
    /// A limit or the sink stopped the search.
    Aborted(String),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "optimality proven"),
            TerminationReason::InfeasibilityProven => write!(f, "infeasibility proven"),
            TerminationReason::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Search counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStatistics {
    /// Solutions reported by the search.
    pub solutions_found: u64,
    /// Model variables compiled.
    pub variables: usize,
    /// Model constraints compiled.
    pub constraints: usize,
    /// Wall-clock time.
    pub solve_duration: Duration,
}

impl fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vars, {} constraints, {} solutions in {:.3}s",
            self.variables,
            self.constraints,
            self.solutions_found,
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Everything a search returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpOutcome {
    /// Status and best solution.
    pub result: CpResult,
    /// Why it stopped.
    pub reason: TerminationReason,
    /// Counters.
    pub statistics: SolverStatistics,
}

impl CpOutcome {
    /// Best solution, if any.
    pub fn solution(&self) -> Option<&CpSolution> {
        match &self.result {
            CpResult::Optimal(s) | CpResult::Feasible(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a solution was found.
    pub fn has_solution(&self) -> bool {
        self.solution().is_some()
    }

    /// Whether optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, CpResult::Optimal(_))
    }
}

/// Why a model could not be handed to Pumpkin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompileError {
    /// Fixed values or constraints conflict at the root.
    Conflict,
    /// A coefficient or bound does not fit Pumpkin's `i32` arithmetic.
    Overflow,
}

/// A model posted into a Pumpkin solver.
struct Compiled {
    solver: Solver,
    vars: Vec<DomainId>,
    objective: DomainId,
}

impl Compiled {
    fn build(model: &CpModel) -> Result<Self, CompileError> {
        if model.is_contradictory() {
            return Err(CompileError::Conflict);
        }
        let mut solver = Solver::default();
        let vars: Vec<DomainId> = (0..model.var_count())
            .map(|i| match model.fixed(VarId(i)) {
                Some(value) => {
                    let v = i32::from(value);
                    solver.new_bounded_integer(v, v)
                }
                None => solver.new_bounded_integer(0, 1),
            })
            .collect();
        let tag = solver.new_constraint_tag();

        for constraint in model.constraints() {
            match constraint {
                Constraint::Clause(lits) => {
                    if lits.is_empty() {
                        return Err(CompileError::Conflict);
                    }
                    let negatives = lits.iter().filter(|l| !l.positive).count();
                    let terms: Vec<_> = lits
                        .iter()
                        .map(|l| vars[l.var.index()].scaled(if l.positive { 1 } else { -1 }))
                        .collect();
                    let rhs = 1 - narrow(negatives as i64)?;
                    solver
                        .add_constraint(constraints::greater_than_or_equals(terms, rhs, tag))
                        .post()
                        .map_err(|_| CompileError::Conflict)?;
                }
                Constraint::Linear { terms, lo, hi } => {
                    if terms.is_empty() {
                        if *lo > 0 || *hi < 0 {
                            return Err(CompileError::Conflict);
                        }
                        continue;
                    }
                    let scaled = terms
                        .iter()
                        .map(|&(var, coef)| Ok(vars[var.index()].scaled(narrow(coef)?)))
                        .collect::<Result<Vec<_>, CompileError>>()?;
                    if *lo != i64::MIN {
                        solver
                            .add_constraint(constraints::greater_than_or_equals(
                                scaled.clone(),
                                narrow(*lo)?,
                                tag,
                            ))
                            .post()
                            .map_err(|_| CompileError::Conflict)?;
                    }
                    if *hi != i64::MAX {
                        solver
                            .add_constraint(constraints::less_than_or_equals(
                                scaled,
                                narrow(*hi)?,
                                tag,
                            ))
                            .post()
                            .map_err(|_| CompileError::Conflict)?;
                    }
                }
            }
        }

        let weights = model.weights();
        let floor: i64 = weights.iter().filter(|&&w| w < 0).sum();
        let ceiling: i64 = weights.iter().filter(|&&w| w > 0).sum();
        let objective = solver.new_bounded_integer(narrow(floor)?, narrow(ceiling)?);
        let mut terms = Vec::with_capacity(vars.len() + 1);
        for (i, &w) in weights.iter().enumerate() {
            if w != 0 {
                terms.push(vars[i].scaled(narrow(w)?));
            }
        }
        terms.push(objective.scaled(-1));
        solver
            .add_constraint(constraints::equals(terms, 0, tag))
            .post()
            .map_err(|_| CompileError::Conflict)?;

        Ok(Self {
            solver,
            vars,
            objective,
        })
    }

    /// Forbids `solution` on the model variables: at least one must flip.
    fn block(&mut self, solution: &CpSolution) -> bool {
        let ones = solution.values.iter().filter(|&&v| v).count();
        let Ok(ones) = i32::try_from(ones) else {
            return false;
        };
        if self.vars.is_empty() {
            return false;
        }
        let terms: Vec<_> = self
            .vars
            .iter()
            .zip(&solution.values)
            .map(|(v, &value)| v.scaled(if value { -1 } else { 1 }))
            .collect();
        let tag = self.solver.new_constraint_tag();
        self.solver
            .add_constraint(constraints::greater_than_or_equals(terms, 1 - ones, tag))
            .post()
            .is_ok()
    }
}

fn read<S: ProblemSolution>(vars: &[DomainId], objective: DomainId, solution: &S) -> CpSolution {
    let values = vars
        .iter()
        .map(|&v| solution.get_integer_value(v) != 0)
        .collect();
    CpSolution::new(values, i64::from(solution.get_integer_value(objective)))
}

fn narrow(value: i64) -> Result<i32, CompileError> {
    i32::try_from(value).map_err(|_| CompileError::Overflow)
}

fn ignore_improvement<B>(_: &Solver, _: SolutionReference, _: &B) {}

/// Boolean CP solver backed by Pumpkin.
///
/// # Example
/// ```
/// use u_duty::cp::{CpModel, CpSolver, SolverConfig};
///
/// let mut model = CpModel::new("pick-one");
/// let a = model.new_var("a");
/// let b = model.new_var("b");
/// model.add_at_most_one(&[a, b]);
/// model.add_objective_term(a, 1);
/// model.add_objective_term(b, 2);
///
/// let outcome = CpSolver::new(SolverConfig::default()).solve(&model);
/// let best = outcome.solution().unwrap();
/// assert!(best.value(b) && !best.value(a));
/// ```
#[derive(Debug, Clone)]
pub struct CpSolver {
    config: SolverConfig,
}

impl CpSolver {
    /// Creates a solver.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver settings.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn statistics(&self, model: &CpModel, started: Instant, found: u64) -> SolverStatistics {
        SolverStatistics {
            solutions_found: found,
            variables: model.var_count(),
            constraints: model.constraint_count(),
            solve_duration: started.elapsed(),
        }
    }

    fn rejected(&self, model: &CpModel, started: Instant, error: CompileError) -> CpOutcome {
        let (result, reason) = match error {
            CompileError::Conflict => (CpResult::Infeasible, TerminationReason::InfeasibilityProven),
            CompileError::Overflow => (
                CpResult::Unknown,
                TerminationReason::Aborted("coefficient out of range".into()),
            ),
        };
        debug!(model = model.name(), ?error, "model rejected before search");
        CpOutcome {
            result,
            reason,
            statistics: self.statistics(model, started, 0),
        }
    }

    /// Finds the assignment maximizing the objective.
    pub fn solve(&self, model: &CpModel) -> CpOutcome {
        let started = Instant::now();
        let mut compiled = match Compiled::build(model) {
            Ok(compiled) => compiled,
            Err(error) => return self.rejected(model, started, error),
        };
        let mut brancher = compiled.solver.default_brancher();
        let mut termination = TimeBudget::starting_now(self.config.time_limit);
        let objective = compiled.objective;
        let result = compiled.solver.optimise(
            &mut brancher,
            &mut termination,
            LinearSatUnsat::new(OptimisationDirection::Maximise, objective, ignore_improvement),
        );

        let (result, reason) = match result {
            OptimisationResult::Optimal(solution) => (
                CpResult::Optimal(read(&compiled.vars, compiled.objective, &solution)),
                TerminationReason::OptimalityProven,
            ),
            OptimisationResult::Satisfiable(solution) => (
                CpResult::Feasible(read(&compiled.vars, compiled.objective, &solution)),
                TerminationReason::Aborted("time limit".into()),
            ),
            OptimisationResult::Unsatisfiable => {
                (CpResult::Infeasible, TerminationReason::InfeasibilityProven)
            }
            OptimisationResult::Unknown => {
                (CpResult::Unknown, TerminationReason::Aborted("time limit".into()))
            }
        };
        let found = u64::from(matches!(result, CpResult::Optimal(_) | CpResult::Feasible(_)));
        let statistics = self.statistics(model, started, found);
        debug!(
            model = model.name(),
            result = %result,
            reason = %reason,
            stats = %statistics,
            "solve finished"
        );
        CpOutcome {
            result,
            reason,
            statistics,
        }
    }

    /// Streams every feasible assignment into `sink`.
    ///
    /// Stops when the space is exhausted, the sink returns `false`, the
    /// solution limit is reached or the time budget runs out. The result
    /// carries the best solution seen.
    pub fn enumerate(&self, model: &CpModel, sink: &mut dyn SolutionSink) -> CpOutcome {
        let started = Instant::now();
        let mut compiled = match Compiled::build(model) {
            Ok(compiled) => compiled,
            Err(error) => return self.rejected(model, started, error),
        };
        let mut termination = TimeBudget::starting_now(self.config.time_limit);
        let mut best: Option<CpSolution> = None;
        let mut found = 0u64;

        let reason = loop {
            if self.config.solution_limit.is_some_and(|limit| found >= limit) {
                break TerminationReason::Aborted("solution limit".into());
            }
            let mut brancher = compiled.solver.default_brancher();
            let solution = match compiled.solver.satisfy(&mut brancher, &mut termination) {
                SatisfactionResult::Satisfiable(solution) => {
                    read(&compiled.vars, compiled.objective, &solution.solution())
                }
                SatisfactionResult::Unsatisfiable(_, _) => {
                    break if found == 0 {
                        TerminationReason::InfeasibilityProven
                    } else {
                        TerminationReason::OptimalityProven
                    };
                }
                SatisfactionResult::Unknown(_, _) => {
                    break TerminationReason::Aborted("time limit".into());
                }
            };
            found += 1;
            trace!(objective = solution.objective, found, "solution");
            if best.as_ref().is_none_or(|b| solution.objective > b.objective) {
                best = Some(solution.clone());
            }
            let exhausted = !compiled.block(&solution);
            if !sink.accept(solution) {
                break TerminationReason::Aborted("sink closed".into());
            }
            if exhausted {
                break TerminationReason::OptimalityProven;
            }
        };

        let result = match (best, &reason) {
            (Some(best), TerminationReason::OptimalityProven) => CpResult::Optimal(best),
            (Some(best), _) => CpResult::Feasible(best),
            (None, TerminationReason::InfeasibilityProven) => CpResult::Infeasible,
            (None, _) => CpResult::Unknown,
        };
        let statistics = self.statistics(model, started, found);
        debug!(
            model = model.name(),
            result = %result,
            reason = %reason,
            stats = %statistics,
            "enumeration finished"
        );
        CpOutcome {
            result,
            reason,
            statistics,
        }
    }
}
