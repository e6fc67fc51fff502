//! Crate-level error type.
//!
//! Input and configuration problems fail fast, before any model is built.
//! An infeasible instance is not an error: the driver reports it through
//! [`crate::scheduler::AssignmentOutcome::success`].

use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationError;

/// Errors surfaced by the assignment core.
#[derive(Error, Debug)]
pub enum Error {
    /// Trip or shift records are malformed.
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    /// A configuration option is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// A solver-produced assignment broke a hard rule.
    ///
    /// Indicates a defect in model construction, never bad input.
    #[error("solver output failed the audit with {violations} hard violation(s), first: {first}")]
    ModelInconsistency { violations: usize, first: String },

    /// An assignment refers to a shift that is not in the roster.
    #[error("unknown shift '{0}'")]
    UnknownShift(String),

    /// An assignment refers to a trip index outside the trip list.
    #[error("unknown trip index {0}")]
    UnknownTrip(usize),

    /// A trip is already held by a shift.
    #[error("trip {trip} is already assigned to shift '{shift}'")]
    TripAlreadyAssigned { trip: String, shift: String },

    /// The worker pool for randomized re-solves could not start.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<Vec<ValidationError>> for Error {
    fn from(errors: Vec<ValidationError>) -> Self {
        Error::InvalidInput(errors)
    }
}

/// Result alias for the assignment core.
pub type Result<T> = std::result::Result<T, Error>;

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
