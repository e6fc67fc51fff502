//! Compatibility rules between trips.
//!
//! Pure predicates deciding whether two trips may follow each other in a
//! shift:
//!
//! - **Overlap**: two trips whose intervals intersect never share a shift.
//! - **Stop chaining**: the arrival stop of the first trip and the
//!   departure stop of the second share a stop-group prefix.
//! - **Dead-head**: when stops do not chain, a registered move may bridge
//!   them; its duration is added to the gap before the rest bounds apply.
//! - **Rest**: the (effective) gap must lie in `[min, max]`, both ends
//!   inclusive. The minimum is lower when the stops chain.
//!
//! Blank stop codes never chain.

use crate::config::{AssignmentConfig, MaxRestPolicy};
use crate::models::{same_stop_group, DeadHead, DeadHeadTable, Minutes, Trip};

/// Whether two trips' time intervals intersect.
///
/// Touching intervals (`a.end == b.start`) do not overlap.
#[inline]
pub fn overlaps(a: &Trip, b: &Trip) -> bool {
    let (first, second) = if a.start <= b.start { (a, b) } else { (b, a) };
    first.end > second.start
}

/// Whether `a`'s arrival stop and `b`'s departure stop are in one group.
#[inline]
pub fn stops_chain(a: &Trip, b: &Trip, prefix_len: usize) -> bool {
    same_stop_group(&a.end_stop, &b.start_stop, prefix_len)
}

/// Outcome of [`chain_with_dead_head`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopLink<'a> {
    /// Stops chain directly.
    Direct,
    /// A dead-head bridges the stops.
    DeadHead(&'a DeadHead),
    /// Nothing connects them.
    Impossible,
}

/// Connects `a`'s arrival to `b`'s departure, directly or via the table.
pub fn chain_with_dead_head<'a>(
    a: &Trip,
    b: &Trip,
    table: &'a DeadHeadTable,
    prefix_len: usize,
) -> StopLink<'a> {
    if stops_chain(a, b, prefix_len) {
        return StopLink::Direct;
    }
    match table.find(&a.end_stop, &b.start_stop, prefix_len) {
        Some(link) => StopLink::DeadHead(link),
        None => StopLink::Impossible,
    }
}

/// How two consecutive trips are joined geographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Same stop group.
    Direct,
    /// Bridged by a registered dead-head.
    DeadHead(DeadHead),
    /// Stops differ and geography is not enforced.
    Unchecked,
}

impl Link {
    /// Minutes the link adds to the raw gap.
    pub fn extra_minutes(&self) -> Minutes {
        match self {
            Link::DeadHead(link) => link.duration,
            _ => 0,
        }
    }

    /// Whether the link consumes a dead-head slot.
    pub fn is_dead_head(&self) -> bool {
        matches!(self, Link::DeadHead(_))
    }
}

/// A valid join between two consecutive trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Geographic link.
    pub link: Link,
    /// Raw gap: `next.start - prev.end`.
    pub gap: Minutes,
    /// Gap compared against the rest bounds (raw gap plus dead-head time).
    pub rest: Minutes,
}

/// Why two trips cannot be consecutive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    /// The intervals intersect.
    Overlap,
    /// Rest is below the required minimum.
    RestTooShort { rest: Minutes, min: Minutes },
    /// Rest exceeds the maximum.
    RestTooLong { rest: Minutes, max: Minutes },
    /// Stops do not chain and no dead-head bridges them.
    NoStopLink,
}

/// How a pair of trips (earlier first) may coexist in one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairRule {
    /// They may run back to back.
    Consecutive(Connection),
    /// They may share a shift only with another trip of that shift between
    /// them.
    NeedsIntermediate(Incompatibility),
    /// They never share a shift.
    Exclusive(Incompatibility),
}

/// Rule set bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Compatibility<'a> {
    config: &'a AssignmentConfig,
}

impl<'a> Compatibility<'a> {
    /// Creates the rule set.
    pub fn new(config: &'a AssignmentConfig) -> Self {
        Self { config }
    }

    /// The configuration in force.
    pub fn config(&self) -> &'a AssignmentConfig {
        self.config
    }

    /// Whether stops chain under the configured prefix length.
    pub fn stops_chain(&self, a: &Trip, b: &Trip) -> bool {
        stops_chain(a, b, self.config.stop_prefix_len)
    }

    /// Minimum rest after `a` before `b`.
    ///
    /// The lower value applies when the stops chain.
    pub fn rest_required(&self, a: &Trip, b: &Trip) -> Minutes {
        if self.stops_chain(a, b) {
            self.config.min_rest_same_stop
        } else {
            self.config.min_rest_other_stop
        }
    }

    /// Geographic link from `a` to `b`, or `None` if geography forbids it.
    pub fn link(&self, a: &Trip, b: &Trip) -> Option<Link> {
        let table = &self.config.dead_heads;
        match chain_with_dead_head(a, b, table, self.config.stop_prefix_len) {
            StopLink::Direct => Some(Link::Direct),
            StopLink::DeadHead(_) | StopLink::Impossible if !self.config.enforce_geography => {
                Some(Link::Unchecked)
            }
            StopLink::DeadHead(link) => Some(Link::DeadHead(link.clone())),
            StopLink::Impossible => None,
        }
    }

    /// Gap from `a` to `b` plus any dead-head driven between them.
    pub fn rest_between(&self, a: &Trip, b: &Trip) -> Minutes {
        let extra = self.link(a, b).map_or(0, |link| link.extra_minutes());
        b.start - a.end + extra
    }

    /// Checks `b` directly following `a`.
    pub fn connect(&self, a: &Trip, b: &Trip) -> Result<Connection, Incompatibility> {
        if overlaps(a, b) || b.start < a.end {
            return Err(Incompatibility::Overlap);
        }
        let gap = b.start - a.end;
        let link = self.link(a, b).ok_or(Incompatibility::NoStopLink)?;
        let rest = gap + link.extra_minutes();
        let min = match link {
            Link::Direct => self.config.min_rest_same_stop,
            _ => self.config.min_rest_other_stop,
        };
        if rest < min {
            return Err(Incompatibility::RestTooShort { rest, min });
        }
        if let Some(max) = self.config.effective_max_rest() {
            if rest > max {
                return Err(Incompatibility::RestTooLong { rest, max });
            }
        }
        Ok(Connection { link, gap, rest })
    }

    /// Classifies a pair. `a` must not start after `b`.
    pub fn pair_rule(&self, a: &Trip, b: &Trip) -> PairRule {
        if overlaps(a, b) {
            return PairRule::Exclusive(Incompatibility::Overlap);
        }
        if self.config.max_rest_policy == MaxRestPolicy::Forbid {
            if let Some(max) = self.config.max_rest {
                let rest = self.rest_between(a, b);
                if rest > max {
                    return PairRule::Exclusive(Incompatibility::RestTooLong { rest, max });
                }
            }
        }
        match self.connect(a, b) {
            Ok(connection) => PairRule::Consecutive(connection),
            Err(reason) => PairRule::NeedsIntermediate(reason),
        }
    }

    /// Whether `m` fits strictly inside the gap between `a` and `b`.
    #[inline]
    pub fn fits_between(a: &Trip, m: &Trip, b: &Trip) -> bool {
        m.start >= a.end && m.end <= b.start
    }
}
