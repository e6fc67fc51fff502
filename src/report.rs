//! Assignment audit and report.
//!
//! Re-checks a shift→trips mapping against every rule and summarizes it.
//!
//! # Checks
//!
//! | Check | Severity |
//! |-------|----------|
//! | Trip index not in the trip list | violation |
//! | Trip in several shifts | violation |
//! | Trip outside shift bounds or inside its break | violation |
//! | Consecutive trips overlap | violation |
//! | Rest below minimum / above maximum | violation |
//! | Any two trips further apart than `max_rest` (`Forbid` policy) | violation |
//! | Dead-heads above the per-shift cap | violation |
//! | Stops do not chain and no dead-head covers it | warning |
//!
//! A violation in solver output means the model was built wrong; a warning
//! means an unregistered non-revenue move would be needed.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Trip count | Trips in the shift |
//! | Max rest | Largest rest between consecutive trips |
//! | Discontinuities | Consecutive pairs whose stops do not chain |
//! | Dead-heads | Registered dead-heads used |
//! | Amplitude | Last end minus first start |
//! | Coverage rate | Assigned trips / all trips, in percent |

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compatibility::{overlaps, Compatibility, Link};
use crate::config::{AssignmentConfig, MaxRestPolicy};
use crate::models::{Minutes, Shift, Solution, Trip};

/// Hard rule categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A trip appears in more than one shift.
    DuplicateAssignment,
    /// A trip lies outside the shift's declared bounds.
    OutOfWindow,
    /// A trip overlaps the shift's break window.
    InBreak,
    /// Two trips of a shift overlap in time.
    Overlap,
    /// Rest below the minimum.
    RestTooShort,
    /// Rest above the maximum.
    RestTooLong,
    /// More dead-heads than the per-shift cap.
    DeadHeadCapExceeded,
    /// A trip index past the end of the trip list.
    UnknownTrip,
}

/// A broken hard rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Category.
    pub kind: ViolationKind,
    /// Shift identifier.
    pub shift: String,
    /// Trip indices involved.
    pub trips: Vec<usize>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.shift, self.message)
    }
}

/// Consecutive trips whose stops do not chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityWarning {
    /// Shift identifier.
    pub shift: String,
    /// Earlier trip index.
    pub from: usize,
    /// Later trip index.
    pub to: usize,
    /// Human-readable description.
    pub message: String,
}

/// Per-shift metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftStats {
    /// Shift identifier.
    pub shift: String,
    /// Number of trips.
    pub trip_count: usize,
    /// Largest rest between consecutive trips (dead-head time included).
    pub max_rest: Option<Minutes>,
    /// Consecutive pairs with non-chaining stops.
    pub discontinuities: usize,
    /// Dead-heads used.
    pub dead_heads: usize,
    /// Amplitude in minutes.
    pub amplitude: Minutes,
}

/// One shift's content, as handed to the audit.
#[derive(Debug, Clone)]
pub struct PlannedShift<'a> {
    /// Shift identifier.
    pub id: String,
    /// The shift record, when the plan targets an existing shift.
    pub shift: Option<&'a Shift>,
    /// Trip indices.
    pub trips: Vec<usize>,
}

impl<'a> PlannedShift<'a> {
    /// A plan for an existing shift record.
    pub fn existing(shift: &'a Shift, trips: Vec<usize>) -> Self {
        Self {
            id: shift.id.clone(),
            shift: Some(shift),
            trips,
        }
    }

    /// A plan for a shift that has no record yet.
    pub fn proposed(id: impl Into<String>, trips: Vec<usize>) -> Self {
        Self {
            id: id.into(),
            shift: None,
            trips,
        }
    }
}

/// Audit result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentReport {
    /// Hard violations.
    pub violations: Vec<Violation>,
    /// Geographic-continuity warnings.
    pub warnings: Vec<ContinuityWarning>,
    /// Per-shift metrics, plan order.
    pub shifts: Vec<ShiftStats>,
    /// Distinct trips assigned.
    pub assigned: usize,
    /// All trips.
    pub total: usize,
    /// `assigned / total` in percent; 100 with no trips.
    pub coverage_rate: f64,
}

impl AssignmentReport {
    /// Audits a plan.
    ///
    /// # Arguments
    /// * `trips` - The full trip list; plans refer to it by index.
    /// * `plan` - Shift contents to check.
    /// * `config` - Rules in force.
    pub fn audit(trips: &[Trip], plan: &[PlannedShift<'_>], config: &AssignmentConfig) -> Self {
        let rules = Compatibility::new(config);
        let mut report = AssignmentReport {
            total: trips.len(),
            ..AssignmentReport::default()
        };

        let mut holders: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for planned in plan {
            for &t in &planned.trips {
                if t < trips.len() {
                    holders.entry(t).or_default().push(planned.id.as_str());
                } else {
                    report.violate(
                        ViolationKind::UnknownTrip,
                        &planned.id,
                        vec![t],
                        format!("trip index {t} is out of range ({} trips)", trips.len()),
                    );
                }
            }
        }
        for (&t, ids) in &holders {
            if ids.len() > 1 {
                report.violations.push(Violation {
                    kind: ViolationKind::DuplicateAssignment,
                    shift: ids.join(","),
                    trips: vec![t],
                    message: format!("trip {} is held by {} shifts", trips[t].label(), ids.len()),
                });
            }
        }
        report.assigned = holders.len();
        report.coverage_rate = if trips.is_empty() {
            100.0
        } else {
            100.0 * report.assigned as f64 / trips.len() as f64
        };

        for planned in plan {
            let stats = report.audit_shift(trips, planned, &rules);
            report.shifts.push(stats);
        }
        report
    }

    /// Audits shift records as they stand.
    pub fn for_shifts(trips: &[Trip], shifts: &[Shift], config: &AssignmentConfig) -> Self {
        let index: HashMap<(&str, &str), usize> =
            trips.iter().enumerate().map(|(i, t)| (t.key(), i)).collect();
        let plan: Vec<PlannedShift<'_>> = shifts
            .iter()
            .map(|shift| {
                let held = shift
                    .trips
                    .iter()
                    .filter_map(|t| index.get(&t.key()).copied())
                    .collect();
                PlannedShift::existing(shift, held)
            })
            .collect();
        Self::audit(trips, &plan, config)
    }

    /// Audits a proposed solution. Shifts are named `{bucket}-{n}`.
    pub fn for_solution(trips: &[Trip], solution: &Solution, config: &AssignmentConfig) -> Self {
        let plan: Vec<PlannedShift<'_>> = solution
            .shifts
            .iter()
            .enumerate()
            .map(|(n, s)| {
                PlannedShift::proposed(format!("{}-{}", s.bucket.label(), n + 1), s.trips.clone())
            })
            .collect();
        Self::audit(trips, &plan, config)
    }

    fn audit_shift(
        &mut self,
        trips: &[Trip],
        planned: &PlannedShift<'_>,
        rules: &Compatibility<'_>,
    ) -> ShiftStats {
        let config = rules.config();
        let id = planned.id.as_str();
        let mut order: Vec<usize> = planned
            .trips
            .iter()
            .copied()
            .filter(|&t| t < trips.len())
            .collect();
        order.sort_by_key(|&t| (trips[t].start, trips[t].end));
        order.dedup();

        if let Some(shift) = planned.shift {
            for &t in &order {
                let trip = &trips[t];
                if shift.admits(trip) {
                    continue;
                }
                let in_break = shift
                    .break_window
                    .is_some_and(|pause| pause.overlaps(&trip.window()));
                let (kind, what) = if in_break {
                    (ViolationKind::InBreak, "overlaps the break window")
                } else {
                    (ViolationKind::OutOfWindow, "is outside the shift bounds")
                };
                self.violate(kind, id, vec![t], format!("trip {} {what}", trip.label()));
            }
        }

        let mut stats = ShiftStats {
            shift: id.to_string(),
            trip_count: order.len(),
            max_rest: None,
            discontinuities: 0,
            dead_heads: 0,
            amplitude: 0,
        };
        if let (Some(&first), Some(&last)) = (order.first(), order.last()) {
            stats.amplitude = trips[last].end - trips[first].start;
        }

        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (prev, next) = (&trips[a], &trips[b]);
            if overlaps(prev, next) {
                self.violate(
                    ViolationKind::Overlap,
                    id,
                    vec![a, b],
                    format!("trips {} and {} overlap", prev.label(), next.label()),
                );
                continue;
            }

            let gap = next.start - prev.end;
            let link = rules.link(prev, next);
            let (rest, min) = match &link {
                Some(Link::Direct) => (gap, config.min_rest_same_stop),
                Some(other) => (gap + other.extra_minutes(), config.min_rest_other_stop),
                None => (gap, config.min_rest_other_stop),
            };
            match link {
                Some(Link::Direct) => {}
                Some(Link::DeadHead(_)) => stats.dead_heads += 1,
                Some(Link::Unchecked) | None => {
                    stats.discontinuities += 1;
                    self.warnings.push(ContinuityWarning {
                        shift: id.to_string(),
                        from: a,
                        to: b,
                        message: format!(
                            "{} ends at '{}' but {} starts at '{}' with no registered dead-head",
                            prev.label(),
                            prev.end_stop,
                            next.label(),
                            next.start_stop
                        ),
                    });
                }
            }
            stats.max_rest = Some(stats.max_rest.map_or(rest, |m| m.max(rest)));

            if rest < min {
                self.violate(
                    ViolationKind::RestTooShort,
                    id,
                    vec![a, b],
                    format!("rest {rest} between {} and {} is below {min}", prev.label(), next.label()),
                );
            }
            if let Some(max) = config.effective_max_rest() {
                if rest > max {
                    self.violate(
                        ViolationKind::RestTooLong,
                        id,
                        vec![a, b],
                        format!("rest {rest} between {} and {} exceeds {max}", prev.label(), next.label()),
                    );
                }
            }
        }

        if config.max_rest_policy == MaxRestPolicy::Forbid {
            if let Some(max) = config.max_rest {
                for (i, &a) in order.iter().enumerate() {
                    for &b in order.iter().skip(i + 2) {
                        let rest = rules.rest_between(&trips[a], &trips[b]);
                        if rest > max {
                            self.violate(
                                ViolationKind::RestTooLong,
                                id,
                                vec![a, b],
                                format!(
                                    "trips {} and {} are {rest} minutes apart, above {max}",
                                    trips[a].label(),
                                    trips[b].label()
                                ),
                            );
                        }
                    }
                }
            }
        }

        if stats.dead_heads > config.dead_heads.max_per_shift {
            self.violate(
                ViolationKind::DeadHeadCapExceeded,
                id,
                order.clone(),
                format!(
                    "{} dead-heads used, cap is {}",
                    stats.dead_heads, config.dead_heads.max_per_shift
                ),
            );
        }

        stats
    }

    fn violate(&mut self, kind: ViolationKind, shift: &str, trips: Vec<usize>, message: String) {
        self.violations.push(Violation {
            kind,
            shift: shift.to_string(),
            trips,
            message,
        });
    }

    /// Whether no hard rule is broken.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Total discontinuities over all shifts.
    pub fn discontinuities(&self) -> usize {
        self.shifts.iter().map(|s| s.discontinuities).sum()
    }

    /// Stats for one shift.
    pub fn shift(&self, id: &str) -> Option<&ShiftStats> {
        self.shifts.iter().find(|s| s.shift == id)
    }
}
