//! Solver driver and alternative scoring.
//!
//! [`ShiftAssigner`] runs the direct trip→shift model for a single
//! assignment, or the chain-selection model for ranked alternatives
//! (streaming enumeration or seeded randomized re-solves).
//!
//! # Score
//!
//! [`SolutionScore`] rates an alternative by coverage, a flat bonus when
//! no trip is orphaned, and a bonus per shift whose amplitude is close to
//! the target duration. Ranking is by descending score; ties keep
//! generation order.

mod driver;
mod scoring;

pub use driver::{
    AlternativeStrategy, AssignmentOutcome, AssignmentStatistics, ShiftAssigner, ShiftAssignment,
    SolveStatus, AUTO_ENUMERATION_MAX_CHAINS, ENUMERATION_OVERSAMPLE,
};
pub use scoring::{score_solution, SolutionScore};
