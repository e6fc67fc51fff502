//! Boolean constraint programming.
//!
//! [`CpModel`] is the declarative 0/1 model the formulations build:
//! clauses, linear bounds and a maximization objective. [`CpSolver`]
//! hands it to the Pumpkin solver in one of two styles:
//! - [`CpSolver::solve`]: best assignment, proven optimal when the search
//!   completes within the time budget.
//! - [`CpSolver::enumerate`]: every feasible assignment, streamed to a
//!   [`SolutionSink`] until a limit or the sink stops it.
//!
//! # Reference
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"
//! - Biere et al. (2009), "Handbook of Satisfiability", Ch. 4

mod model;
mod solver;

pub use model::{Constraint, CpModel, Lit, VarId};
pub use solver::{
    CpOutcome, CpResult, CpSolution, CpSolver, Discard, SolutionSink, SolverConfig,
    SolverStatistics, TerminationReason,
};
