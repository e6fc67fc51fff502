//! Duty scheduling domain models.
//!
//! Provides the data types exchanged between the assignment core and its
//! collaborators (importers, UIs, exporters).
//!
//! # Domain Mappings
//!
//! | u-duty | Operator vocabulary | Generic scheduling |
//! |--------|---------------------|--------------------|
//! | Trip | Voyage | Task with a fixed time slot |
//! | Shift | Service | Resource |
//! | DeadHead | HLP (haut-le-pied) | Setup / transition |
//! | Chain | Enchaînement | Candidate sequence |
//! | Solution | Proposition | Schedule |
//! | Roster | Journée d'exploitation | Problem instance |

mod chain;
mod dead_head;
mod roster;
mod shift;
mod solution;
mod trip;
mod window;

pub use chain::Chain;
pub use dead_head::{same_stop_group, stop_prefix, DeadHead, DeadHeadTable, DEFAULT_STOP_PREFIX_LEN};
pub use roster::Roster;
pub use shift::{Shift, ShiftKind};
pub use solution::{ProposedShift, ShiftBucket, Solution, SolutionSet, SolutionSignature};
pub use trip::Trip;
pub use window::{format_clock, parse_clock, ClockError, Minutes, TimeWindow, MINUTES_PER_DAY};
