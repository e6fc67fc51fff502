//! Transit duty scheduling for the U-Engine ecosystem.
//!
//! Assigns trips ("voyages") to shifts ("services") under temporal,
//! rest, geographic and dead-head rules. Produces either one optimized
//! assignment or a ranked list of alternative shift packings an operator
//! can choose from.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Trip`, `Shift`, `DeadHeadTable`, `Chain`,
//!   `Solution`, `SolutionSet`, `Roster`
//! - **`config`**: `AssignmentConfig` and its weights and policies
//! - **`validation`**: Input integrity checks (inverted trips, duplicate ids,
//!   bad bounds, trips held twice)
//! - **`compatibility`**: Pairwise rules (overlap, rest, stop chaining,
//!   dead-heads)
//! - **`chains`**: Candidate shift contents (depth-first and brute force)
//! - **`cp`**: Boolean constraint model solved with Pumpkin
//! - **`formulation`**: Direct trip→shift and chain-selection models
//! - **`scheduler`**: `ShiftAssigner` driver and alternative scoring
//! - **`report`**: Post-solve audit and statistics
//!
//! # Data Flow
//!
//! ```text
//! trips + shifts ──> validation ──> formulation ──> cp ──> report
//!                                      ^   ^
//!                        compatibility ┘   └ chains
//! ```
//!
//! # Example
//!
//! ```
//! use u_duty::config::AssignmentConfig;
//! use u_duty::models::{Roster, Shift, Trip};
//! use u_duty::scheduler::ShiftAssigner;
//!
//! let trips = vec![
//!     Trip::from_clock("L1", "101", "GARE", "MAIRIE", "06:00", "07:00").unwrap(),
//!     Trip::from_clock("L1", "102", "MAIRIE", "PORT", "07:10", "08:00").unwrap(),
//! ];
//! let mut roster = Roster::new(trips, vec![Shift::morning("S1").with_bounds(360, 720)]);
//!
//! let outcome = ShiftAssigner::new(AssignmentConfig::default())
//!     .assign(&roster.trips, &roster.shifts)
//!     .unwrap();
//! roster.apply_assignment(&outcome).unwrap();
//! assert!(roster.unassigned_trips().is_empty());
//! ```
//!
//! # References
//!
//! - Desrochers & Soumis (1989), "A column generation approach to the urban
//!   transit crew scheduling problem"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

pub mod chains;
pub mod compatibility;
pub mod config;
pub mod cp;
pub mod error;
pub mod formulation;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
