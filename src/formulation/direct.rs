//! Direct trip→shift formulation.
//!
//! One boolean `x[t][s]` per (trip, shift): "trip `t` runs in shift `s`".
//!
//! # Constraints
//!
//! | Rule | Encoding |
//! |------|----------|
//! | One shift per trip | `Σ_s x[t][s] <= 1` |
//! | Shift bounds, break window | `x[t][s] = 0` when the shift does not admit `t` |
//! | Pre-existing assignment | `x[t][s] = 1` |
//! | Overlap | `¬x[a][s] ∨ ¬x[b][s]` |
//! | Rest or stop rule broken | `¬x[a][s] ∨ ¬x[b][s] ∨ x[m1][s] ∨ ...` over trips `m` fitting between `a` and `b` |
//! | Dead-head cap | `z ≥ x[a] + x[b] − 1 − Σ x[m]` per bridged pair, `Σ z <= cap` per shift |
//! | Fairness (optional) | `lo <= Σ_t x[t][s] <= hi` |
//!
//! A pair that may not run back to back may still share a shift when
//! another trip of that shift sits between them. Applied to every pair,
//! this makes every consecutive pair of a shift satisfy the rules.
//!
//! # Objective (maximize)
//!
//! - `objective.trip` per assigned trip
//! - up to `objective.boundary` as the trip approaches a declared bound
//!   of its shift
//! - `objective.continuity` when a new trip stop-chains with a
//!   pre-existing trip of the same shift
//!
//! An unsatisfiable instance still yields a model; infeasibility shows up
//! at solve time.

use tracing::debug;

use crate::compatibility::{Compatibility, PairRule};
use crate::config::AssignmentConfig;
use crate::cp::{CpModel, CpSolution, VarId};
use crate::models::{Shift, Trip};
use crate::validation::locked_trip_indices;

/// A built direct model with its variable map.
#[derive(Debug, Clone)]
pub struct DirectModel {
    /// The boolean model.
    pub model: CpModel,
    /// `assign[t][s]`.
    pub assign: Vec<Vec<VarId>>,
    /// Per shift: dead-head usage indicators.
    pub dead_head_vars: Vec<Vec<VarId>>,
}

impl DirectModel {
    /// Variable for trip `t` in shift `s`.
    #[inline]
    pub fn var(&self, trip: usize, shift: usize) -> VarId {
        self.assign[trip][shift]
    }

    /// Trip indices per shift, in time order.
    pub fn decode(&self, solution: &CpSolution, trips: &[Trip]) -> Vec<Vec<usize>> {
        let shift_count = self.assign.first().map_or(0, Vec::len);
        (0..shift_count)
            .map(|s| {
                let mut held: Vec<usize> = (0..self.assign.len())
                    .filter(|&t| solution.value(self.assign[t][s]))
                    .collect();
                held.sort_by_key(|&t| (trips[t].start, trips[t].end));
                held
            })
            .collect()
    }
}

/// Builds the direct model.
///
/// # Example
/// ```
/// use u_duty::config::AssignmentConfig;
/// use u_duty::formulation::DirectModelBuilder;
/// use u_duty::models::{Shift, Trip};
///
/// let trips = vec![
///     Trip::new("L1", "1", "X", "Y", 360, 420),
///     Trip::new("L1", "2", "Y", "Z", 430, 480),
/// ];
/// let shifts = vec![Shift::morning("S1").with_bounds(360, 720)];
/// let config = AssignmentConfig::default();
/// let built = DirectModelBuilder::new(&trips, &shifts, &config).build();
/// assert_eq!(built.model.var_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DirectModelBuilder<'a> {
    trips: &'a [Trip],
    shifts: &'a [Shift],
    config: &'a AssignmentConfig,
    locked: Vec<Vec<usize>>,
}

impl<'a> DirectModelBuilder<'a> {
    /// Creates a builder. Pre-existing shift trips become locked.
    pub fn new(trips: &'a [Trip], shifts: &'a [Shift], config: &'a AssignmentConfig) -> Self {
        Self {
            trips,
            shifts,
            config,
            locked: locked_trip_indices(trips, shifts),
        }
    }

    /// Locked trip indices per shift.
    pub fn locked(&self) -> &[Vec<usize>] {
        &self.locked
    }

    /// Builds a fresh model.
    pub fn build(&self) -> DirectModel {
        let n = self.trips.len();
        let shift_count = self.shifts.len();
        let rules = Compatibility::new(self.config);
        let mut model = CpModel::new("direct");

        let assign: Vec<Vec<VarId>> = (0..n)
            .map(|t| {
                (0..shift_count)
                    .map(|s| model.new_var(format!("x[{t}][{s}]")))
                    .collect()
            })
            .collect();

        for row in &assign {
            model.add_at_most_one(row);
        }

        let mut admitted = vec![vec![false; shift_count]; n];
        for (s, shift) in self.shifts.iter().enumerate() {
            for (t, trip) in self.trips.iter().enumerate() {
                admitted[t][s] = shift.admits(trip);
                if !admitted[t][s] {
                    model.fix(assign[t][s], false);
                }
            }
            for &t in &self.locked[s] {
                model.fix(assign[t][s], true);
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&t| (self.trips[t].start, self.trips[t].end, t));

        let mut dead_head_vars: Vec<Vec<VarId>> = vec![Vec::new(); shift_count];
        let mut stats = PairStats::default();

        for (i, &a) in order.iter().enumerate() {
            for (j, &b) in order.iter().enumerate().skip(i + 1) {
                let (first, second) = (&self.trips[a], &self.trips[b]);
                let rule = rules.pair_rule(first, second);
                let needs_between = match &rule {
                    PairRule::Exclusive(_) => false,
                    PairRule::NeedsIntermediate(_) => true,
                    PairRule::Consecutive(connection) => connection.link.is_dead_head(),
                };
                // Anything fitting between the two sorts strictly between them.
                let between: Vec<usize> = if needs_between {
                    order[i + 1..j]
                        .iter()
                        .copied()
                        .filter(|&m| Compatibility::fits_between(first, &self.trips[m], second))
                        .collect()
                } else {
                    Vec::new()
                };

                for s in 0..shift_count {
                    if !admitted[a][s] || !admitted[b][s] {
                        continue;
                    }
                    let (xa, xb) = (assign[a][s], assign[b][s]);
                    match &rule {
                        PairRule::Exclusive(_) => {
                            model.add_clause(vec![xa.is_false(), xb.is_false()]);
                            stats.exclusive += 1;
                        }
                        PairRule::NeedsIntermediate(_) => {
                            let mut clause = vec![xa.is_false(), xb.is_false()];
                            clause.extend(
                                between
                                    .iter()
                                    .filter(|&&m| admitted[m][s])
                                    .map(|&m| assign[m][s].is_true()),
                            );
                            if clause.len() == 2 {
                                stats.exclusive += 1;
                            } else {
                                stats.intermediate += 1;
                            }
                            model.add_clause(clause);
                        }
                        PairRule::Consecutive(connection) if connection.link.is_dead_head() => {
                            let z = model.new_var(format!("dh[{a}][{b}][{s}]"));
                            let mut terms = vec![(z, 1), (xa, -1), (xb, -1)];
                            terms.extend(
                                between
                                    .iter()
                                    .filter(|&&m| admitted[m][s])
                                    .map(|&m| (assign[m][s], 1)),
                            );
                            model.add_linear_ge(&terms, -1);
                            dead_head_vars[s].push(z);
                        }
                        PairRule::Consecutive(_) => {}
                    }
                }
            }
        }

        let cap = i64::try_from(self.config.dead_heads.max_per_shift).unwrap_or(i64::MAX);
        for vars in &dead_head_vars {
            if !vars.is_empty() {
                model.add_at_most(vars, cap);
            }
        }

        if let Some(band) = self.config.fairness {
            let (lo, hi) = band.limits(n, shift_count);
            let lo = i64::try_from(lo).unwrap_or(i64::MAX);
            let hi = i64::try_from(hi).unwrap_or(i64::MAX);
            for s in 0..shift_count {
                let terms: Vec<(VarId, i64)> = (0..n).map(|t| (assign[t][s], 1)).collect();
                model.add_linear(&terms, lo, hi);
            }
        }

        let locked_anywhere = self.locked_mask();
        for (s, shift) in self.shifts.iter().enumerate() {
            for (t, trip) in self.trips.iter().enumerate() {
                if !admitted[t][s] {
                    continue;
                }
                let mut weight = self.config.objective.trip;
                weight += boundary_bonus(shift, trip, self.config.objective.boundary);
                if !locked_anywhere[t]
                    && self.locked[s].iter().any(|&l| {
                        rules.stops_chain(&self.trips[l], trip) || rules.stops_chain(trip, &self.trips[l])
                    })
                {
                    weight += self.config.objective.continuity;
                }
                model.add_objective_term(assign[t][s], weight);
            }
        }

        debug!(
            trips = n,
            shifts = shift_count,
            vars = model.var_count(),
            constraints = model.constraint_count(),
            exclusive = stats.exclusive,
            intermediate = stats.intermediate,
            "direct model built"
        );

        DirectModel {
            model,
            assign,
            dead_head_vars,
        }
    }

    fn locked_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.trips.len()];
        for &t in self.locked.iter().flatten() {
            mask[t] = true;
        }
        mask
    }
}

#[derive(Debug, Default)]
struct PairStats {
    exclusive: usize,
    intermediate: usize,
}

/// Bonus growing linearly as the trip nears a declared bound of `shift`.
///
/// With span `W` of the bound window and distance `d` to the nearest
/// declared bound: `weight · (W − d) / W`. Zero without bounds.
pub fn boundary_bonus(shift: &Shift, trip: &Trip, weight: i64) -> i64 {
    let Some(window) = shift.bounds() else {
        return 0;
    };
    let span = i64::from(window.duration());
    if span <= 0 {
        return 0;
    }
    let distance = [
        shift.earliest_start.map(|start| trip.start - start),
        shift.latest_end.map(|end| end - trip.end),
    ]
    .into_iter()
    .flatten()
    .min()
    .map_or(span, |d| i64::from(d.max(0)));
    weight * (span - distance).max(0) / span
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{Constraint, CpSolver, SolverConfig};
    use crate::models::{DeadHead, TimeWindow};

    fn trip(id: &str, from: &str, to: &str, start: i32, end: i32) -> Trip {
        Trip::new("L1", id, from, to, start, end)
    }

    fn config() -> AssignmentConfig {
        AssignmentConfig::new()
            .with_min_rest(5, 15)
            .with_max_rest(Some(60))
    }

    fn solve(built: &DirectModel) -> CpSolution {
        CpSolver::new(SolverConfig::default())
            .solve(&built.model)
            .solution()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_variable_grid() {
        let trips = vec![trip("1", "X", "Y", 360, 420), trip("2", "Y", "Z", 430, 480)];
        let shifts = vec![Shift::morning("S1"), Shift::morning("S2")];
        let cfg = config();
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        assert_eq!(built.assign.len(), 2);
        assert_eq!(built.assign[0].len(), 2);
        assert_eq!(built.model.var_count(), 4);
        assert_eq!(built.model.var_name(built.var(1, 0)), "x[1][0]");
    }

    #[test]
    fn test_out_of_window_forced_out() {
        let trips = vec![trip("1", "X", "Y", 780, 840)];
        let shifts = vec![Shift::morning("S1").with_bounds(360, 720)];
        let cfg = config();
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        assert_eq!(built.model.fixed(built.var(0, 0)), Some(false));
        let solution = solve(&built);
        assert!(!solution.value(built.var(0, 0)));
    }

    #[test]
    fn test_break_window_forced_out() {
        let trips = vec![trip("1", "X", "Y", 700, 760), trip("2", "X", "Y", 500, 560)];
        let shifts = vec![Shift::split("S1", TimeWindow::new(690, 900))];
        let cfg = config();
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        assert_eq!(built.model.fixed(built.var(0, 0)), Some(false));
        assert_eq!(built.model.fixed(built.var(1, 0)), None);
    }

    #[test]
    fn test_locked_trip_fixed() {
        let trips = vec![trip("1", "X", "Y", 360, 420), trip("2", "Y", "Z", 423, 480)];
        let shifts = vec![Shift::morning("S1").with_trip(trips[1].clone())];
        let cfg = config();
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        assert_eq!(built.model.fixed(built.var(1, 0)), Some(true));
        let solution = solve(&built);
        // Rest 3 < 5: the new trip gives way to the locked one.
        assert!(solution.value(built.var(1, 0)));
        assert!(!solution.value(built.var(0, 0)));
    }

    #[test]
    fn test_intermediate_clause_structure() {
        // a and b are 90 minutes apart with max rest 50; m fits between.
        let trips = vec![
            trip("a", "X", "Y", 360, 420),
            trip("m", "Y", "Y", 450, 480),
            trip("b", "Y", "Z", 510, 560),
        ];
        let shifts = vec![Shift::morning("S1")];
        let cfg = config().with_max_rest(Some(50));
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        let (a, m, b) = (built.var(0, 0), built.var(1, 0), built.var(2, 0));
        let expected = vec![a.is_false(), b.is_false(), m.is_true()];
        assert!(built
            .model
            .constraints()
            .iter()
            .any(|c| *c == Constraint::Clause(expected.clone())));

        let solution = solve(&built);
        assert!(solution.value(a) && solution.value(m) && solution.value(b));
    }

    #[test]
    fn test_no_intermediate_means_exclusion() {
        let trips = vec![trip("a", "X", "Y", 360, 420), trip("b", "Y", "Z", 510, 560)];
        let shifts = vec![Shift::morning("S1")];
        let cfg = config().with_max_rest(Some(50));
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        let solution = solve(&built);
        let held = built.decode(&solution, &trips);
        assert_eq!(held[0].len(), 1);
    }

    #[test]
    fn test_two_shifts_split_incompatible_pair() {
        let trips = vec![trip("a", "X", "Y", 360, 420), trip("b", "Y", "Z", 423, 480)];
        let shifts = vec![Shift::morning("S1"), Shift::morning("S2")];
        let cfg = config();
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        let held = built.decode(&solve(&built), &trips);
        assert_eq!(held.iter().map(Vec::len).sum::<usize>(), 2);
        assert!(held.iter().all(|h| h.len() == 1));
    }

    #[test]
    fn test_dead_head_cap() {
        let trips = vec![
            trip("0", "AAA", "PPP", 360, 400),
            trip("1", "QQQ", "PPP", 420, 460),
            trip("2", "QQQ", "ZZZ", 480, 520),
        ];
        let cfg = config().with_dead_head(DeadHead::new("PPP", "QQQ", 5));
        let shifts = vec![Shift::morning("S1")];
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        assert_eq!(built.dead_head_vars[0].len(), 2);
        let held = built.decode(&solve(&built), &trips);
        // Two dead-heads would be needed for all three.
        assert_eq!(held[0].len(), 2);

        let cfg = cfg.with_dead_heads(
            crate::models::DeadHeadTable::new()
                .with_link(DeadHead::new("PPP", "QQQ", 5))
                .with_max_per_shift(2),
        );
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        let held = built.decode(&solve(&built), &trips);
        assert_eq!(held[0], vec![0, 1, 2]);
    }

    #[test]
    fn test_fairness_band_spreads_trips() {
        let trips: Vec<Trip> = (0..4)
            .map(|i| trip(&i.to_string(), "X", "X", 360 + i * 30, 380 + i * 30))
            .collect();
        let shifts = vec![Shift::morning("S1"), Shift::morning("S2")];
        let cfg = config().with_fairness(crate::config::FairnessBand::new(0, 0));
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        let held = built.decode(&solve(&built), &trips);
        assert_eq!(held[0].len(), 2);
        assert_eq!(held[1].len(), 2);
    }

    #[test]
    fn test_boundary_bonus() {
        let shift = Shift::morning("S1").with_bounds(360, 720);
        assert_eq!(boundary_bonus(&shift, &trip("a", "X", "Y", 360, 400), 20), 20);
        assert_eq!(boundary_bonus(&shift, &trip("b", "X", "Y", 500, 540), 20), 12);
        assert_eq!(boundary_bonus(&Shift::morning("S2"), &trip("c", "X", "Y", 360, 400), 20), 0);
    }

    #[test]
    fn test_continuity_bonus_prefers_chaining_shift() {
        let trips = vec![
            trip("locked1", "A", "PPP", 360, 420),
            trip("locked2", "A", "QQQ", 360, 420),
            trip("new", "QQQ", "Z", 440, 500),
        ];
        let shifts = vec![
            Shift::morning("S1").with_trip(trips[0].clone()),
            Shift::morning("S2").with_trip(trips[1].clone()),
        ];
        let cfg = config().with_geography(false);
        let built = DirectModelBuilder::new(&trips, &shifts, &cfg).build();
        assert!(built.model.weight(built.var(2, 1)) > built.model.weight(built.var(2, 0)));
        let held = built.decode(&solve(&built), &trips);
        assert_eq!(held[1], vec![1, 2]);
    }
}
