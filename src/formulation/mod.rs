//! Constraint model builders.
//!
//! Two formulations over the same compatibility rules:
//!
//! - [`DirectModelBuilder`]: one variable per (trip, shift). Assigns trips
//!   to existing shifts, honoring bounds and pre-existing trips.
//! - [`ChainModelBuilder`]: one variable per candidate chain. Packs the
//!   unassigned pool into new morning/afternoon shifts; used for ranked
//!   alternatives.
//!
//! Every build returns a fresh [`crate::cp::CpModel`]; no state is shared
//! between solves.

mod chained;
mod direct;

pub use chained::{ChainModel, ChainModelBuilder, SlotLimits};
pub use direct::{boundary_bonus, DirectModel, DirectModelBuilder};
